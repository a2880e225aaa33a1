//! Hierarchy scope rewriting
//!
//! Filtering by a section id or code means "direct members of the section"
//! unless the subsections flag is set, in which case it means "members of
//! the section or any section below it". Both are stored as separate fields
//! on the document; this step picks one.

use super::key::split;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names involved in hierarchy rewriting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyFields {
    /// Flag selecting transitive membership
    pub flag: String,
    /// Keys naming a section by id
    pub id_scopes: Vec<String>,
    /// Keys naming a section by code
    pub code_scopes: Vec<String>,
    pub direct_ids: String,
    pub transitive_ids: String,
    pub direct_codes: String,
    pub transitive_codes: String,
}

impl Default for HierarchyFields {
    fn default() -> Self {
        Self {
            flag: "INCLUDE_SUBSECTIONS".to_string(),
            id_scopes: vec!["IBLOCK_SECTION_ID".to_string(), "SECTION_ID".to_string()],
            code_scopes: vec!["SECTION_CODE".to_string()],
            direct_ids: "GROUP_IDS".to_string(),
            transitive_ids: "NAV_CHAIN_IDS".to_string(),
            direct_codes: "GROUP_CODES".to_string(),
            transitive_codes: "NAV_CHAIN_CODES".to_string(),
        }
    }
}

impl HierarchyFields {
    /// Rewrite hierarchy scope keys of a top-level filter.
    ///
    /// The flag entry is removed. Rewritten entries keep their operator
    /// prefix and their position; a rewrite that collides with a later
    /// entry of the same key is overwritten by it.
    pub fn rewrite(&self, filter: &Map<String, Value>) -> Map<String, Value> {
        let include_subsections = filter
            .iter()
            .find(|(key, _)| split(key).is_some_and(|(_, field)| field == self.flag))
            .is_some_and(|(_, value)| flag_is_set(value));

        let mut out = Map::with_capacity(filter.len());
        for (key, value) in filter {
            let Some((prefix, field)) = split(key) else {
                out.insert(key.clone(), value.clone());
                continue;
            };

            if field == self.flag {
                continue;
            }

            let target = if self.id_scopes.iter().any(|s| s == field) {
                Some(if include_subsections {
                    &self.transitive_ids
                } else {
                    &self.direct_ids
                })
            } else if self.code_scopes.iter().any(|s| s == field) {
                Some(if include_subsections {
                    &self.transitive_codes
                } else {
                    &self.direct_codes
                })
            } else {
                None
            };

            match target {
                Some(target) => {
                    tracing::debug!(from = %key, to = %target, "rewrote hierarchy scope");
                    out.insert(format!("{prefix}{target}"), value.clone());
                }
                None => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        out
    }
}

/// Truthy, and not the literal `"N"`
fn flag_is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s == "N"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rewrite(filter: Value) -> Value {
        let filter = filter.as_object().cloned().unwrap_or_default();
        Value::Object(HierarchyFields::default().rewrite(&filter))
    }

    #[test]
    fn test_direct_membership_by_default() {
        assert_eq!(
            rewrite(json!({"ACTIVE": "Y", "SECTION_ID": 5, "SECTION_CODE": "shoes"})),
            json!({"ACTIVE": "Y", "GROUP_IDS": 5, "GROUP_CODES": "shoes"})
        );
    }

    #[test]
    fn test_transitive_membership_with_flag() {
        assert_eq!(
            rewrite(json!({"IBLOCK_SECTION_ID": [1, 2], "INCLUDE_SUBSECTIONS": "Y"})),
            json!({"NAV_CHAIN_IDS": [1, 2]})
        );
        assert_eq!(
            rewrite(json!({"INCLUDE_SUBSECTIONS": true, "SECTION_CODE": "shoes"})),
            json!({"NAV_CHAIN_CODES": "shoes"})
        );
    }

    #[test]
    fn test_flag_n_means_direct() {
        assert_eq!(
            rewrite(json!({"SECTION_ID": 5, "INCLUDE_SUBSECTIONS": "N"})),
            json!({"GROUP_IDS": 5})
        );
    }

    #[test]
    fn test_prefix_and_position_are_kept() {
        let out = rewrite(json!({"A": 1, "!SECTION_ID": 5, "B": 2}));
        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["A", "!GROUP_IDS", "B"]);
    }

    #[test]
    fn test_nested_groups_are_untouched() {
        let input = json!({"sub": {"LOGIC": "OR", "SECTION_ID": 1, "SECTION_CODE": "x"}});
        assert_eq!(rewrite(input.clone()), input);
    }
}
