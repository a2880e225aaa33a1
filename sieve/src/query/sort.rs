//! Sort directives
//!
//! A directive is `asc` or `desc`, optionally with `nulls,` in front
//! (empty values first) or `,nulls` behind (empty values last).

use super::dsl::{Missing, Script, ScriptSort, SortClause, SortOrder};
use super::skip_or_fail;
use crate::schema::{PropertyKind, SchemaMap};
use crate::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(nulls\s*,\s*)?(asc|desc)(\s*,\s*nulls)?\s*$").expect("valid regex")
});

/// Suffix of the field holding the decoded value of an enumerated field
const ENUM_VALUE_SUFFIX: &str = "_VALUE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullOrder {
    /// Engine default placement
    #[default]
    None,
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    pub field: String,
    pub order: SortOrder,
    pub nulls: NullOrder,
}

impl SortDirective {
    pub fn parse(field: impl Into<String>, directive: &str) -> Result<Self> {
        let invalid = || Error::InvalidSortFormat(directive.to_string());
        let caps = DIRECTIVE.captures(directive).ok_or_else(invalid)?;

        let nulls = match (caps.get(1).is_some(), caps.get(3).is_some()) {
            (false, false) => NullOrder::None,
            (true, false) => NullOrder::First,
            (false, true) => NullOrder::Last,
            (true, true) => return Err(invalid()),
        };
        let order = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            _ => return Err(invalid()),
        };

        Ok(Self {
            field: field.into(),
            order,
            nulls,
        })
    }
}

/// Compiles `field -> directive` pairs into sort clauses
#[derive(Debug, Clone)]
pub struct SortCompiler {
    strict: bool,
}

impl Default for SortCompiler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SortCompiler {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Compile sort pairs in order. No pairs, no clauses.
    pub fn compile<I, K, V>(&self, schema: &SchemaMap, sort: I) -> Result<Vec<SortClause>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut clauses = Vec::new();
        for (field, directive) in sort {
            let field = field.as_ref();
            let compiled = self.compile_one(schema, field, directive.as_ref());
            if let Some(compiled) = skip_or_fail(self.strict, "sort entry", field, compiled)? {
                clauses.extend(compiled);
            }
        }
        tracing::debug!(clauses = clauses.len(), "compiled sort");
        Ok(clauses)
    }

    /// Compile a sort given as a JSON object of `field: "directive"`
    pub fn compile_map(&self, schema: &SchemaMap, sort: &Map<String, Value>) -> Result<Vec<SortClause>> {
        let mut pairs = Vec::with_capacity(sort.len());
        for (field, directive) in sort {
            let directive = match directive.as_str() {
                Some(d) => Ok(d),
                None => Err(Error::InvalidSortFormat(directive.to_string())),
            };
            if let Some(directive) = skip_or_fail(self.strict, "sort entry", field, directive)? {
                pairs.push((field.as_str(), directive));
            }
        }
        self.compile(schema, pairs)
    }

    fn compile_one(&self, schema: &SchemaMap, field: &str, directive: &str) -> Result<Vec<SortClause>> {
        let directive = SortDirective::parse(field, directive)?;
        let resolved = schema.resolve_alias(field)?;
        let property = schema.get(resolved)?;

        let (target, kind) = if property.has_enum_field() {
            let target = format!("{resolved}{ENUM_VALUE_SUFFIX}");
            let kind = schema
                .find(&target)
                .map(|p| p.kind().clone())
                .unwrap_or_else(|| property.kind().clone());
            (target, kind)
        } else {
            (resolved.to_string(), property.kind().clone())
        };

        let missing = match directive.nulls {
            NullOrder::None => None,
            NullOrder::First => Some(Missing::First),
            NullOrder::Last => Some(Missing::Last),
        };

        let mut clauses = Vec::with_capacity(2);
        if let Some(missing) = missing {
            clauses.push(null_bucket(&target, &kind, missing));
        }
        clauses.push(SortClause::field(target, directive.order, missing));
        Ok(clauses)
    }
}

/// Script clause ranking empty documents 0 and the rest 1.
///
/// A document is empty when the field is absent or holds the kind's
/// canonical empty value. Dates only count absence.
fn null_bucket(field: &str, kind: &PropertyKind, missing: Missing) -> SortClause {
    let mut params = Map::new();
    params.insert("field".to_string(), Value::String(field.to_string()));

    let source = match kind.empty_value() {
        Some(empty) => {
            params.insert("empty".to_string(), empty);
            "doc[params.field].size() == 0 || doc[params.field].value == params.empty ? 0 : 1"
        }
        None => "doc[params.field].size() == 0 ? 0 : 1",
    };

    SortClause::Script {
        script: ScriptSort {
            sort_type: "number".to_string(),
            script: Script {
                lang: "painless".to_string(),
                source: source.to_string(),
                params,
            },
            order: match missing {
                Missing::First => SortOrder::Asc,
                Missing::Last => SortOrder::Desc,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyType;
    use serde_json::json;

    fn schema() -> SchemaMap {
        SchemaMap::new()
            .with("ID", PropertyKind::Integer)
            .with("SORT", PropertyKind::Integer)
            .with("PRICE", PropertyKind::Float)
            .with("DATE_CREATE", PropertyKind::Date)
            .with(
                "PROPERTY_COLOR",
                PropertyType::new(PropertyKind::Integer)
                    .with_parameter("fields", json!({"enum": {"type": "integer"}})),
            )
            .with("PROPERTY_COLOR_VALUE", PropertyKind::Keyword)
            .with("PROPERTY_11", PropertyType::alias("PROPERTY_COLOR"))
            .with("SECTION_ID", PropertyType::alias("ID"))
    }

    fn compile(strict: bool, sort: &[(&str, &str)]) -> Result<Value> {
        SortCompiler::new(strict)
            .compile(&schema(), sort.iter().copied())
            .map(|clauses| serde_json::to_value(clauses).unwrap())
    }

    // ===================================================================
    // Directive grammar
    // ===================================================================

    #[test]
    fn test_parse_directives() {
        let d = SortDirective::parse("ID", "ASC").unwrap();
        assert_eq!((d.order, d.nulls), (SortOrder::Asc, NullOrder::None));

        let d = SortDirective::parse("ID", "nulls, desc").unwrap();
        assert_eq!((d.order, d.nulls), (SortOrder::Desc, NullOrder::First));

        let d = SortDirective::parse("ID", "asc ,NULLS").unwrap();
        assert_eq!((d.order, d.nulls), (SortOrder::Asc, NullOrder::Last));
    }

    #[test]
    fn test_malformed_directives() {
        for raw in ["", "up", "nulls", "nulls,asc,nulls", "ascending"] {
            assert!(
                matches!(SortDirective::parse("ID", raw), Err(Error::InvalidSortFormat(_))),
                "{raw:?}"
            );
        }
    }

    // ===================================================================
    // Compilation
    // ===================================================================

    #[test]
    fn test_plain_sort() {
        assert_eq!(
            compile(true, &[("SORT", "asc"), ("ID", "desc")]).unwrap(),
            json!([{"SORT": {"order": "asc"}}, {"ID": {"order": "desc"}}])
        );
        assert_eq!(compile(true, &[]).unwrap(), json!([]));
    }

    #[test]
    fn test_nulls_last_emits_bucket_then_natural_clause() {
        assert_eq!(
            compile(true, &[("PRICE", "asc,nulls")]).unwrap(),
            json!([
                {"_script": {
                    "type": "number",
                    "script": {
                        "lang": "painless",
                        "source": "doc[params.field].size() == 0 || doc[params.field].value == params.empty ? 0 : 1",
                        "params": {"field": "PRICE", "empty": 0.0}
                    },
                    "order": "desc"
                }},
                {"PRICE": {"order": "asc", "missing": "_last"}}
            ])
        );
    }

    #[test]
    fn test_nulls_first_on_dates_counts_absence_only() {
        assert_eq!(
            compile(true, &[("DATE_CREATE", "nulls,desc")]).unwrap(),
            json!([
                {"_script": {
                    "type": "number",
                    "script": {
                        "lang": "painless",
                        "source": "doc[params.field].size() == 0 ? 0 : 1",
                        "params": {"field": "DATE_CREATE"}
                    },
                    "order": "asc"
                }},
                {"DATE_CREATE": {"order": "desc", "missing": "_first"}}
            ])
        );
    }

    #[test]
    fn test_enum_fields_sort_by_decoded_value() {
        let expected = json!([{"PROPERTY_COLOR_VALUE": {"order": "asc"}}]);
        assert_eq!(compile(true, &[("PROPERTY_COLOR", "asc")]).unwrap(), expected);
        assert_eq!(compile(true, &[("PROPERTY_11", "asc")]).unwrap(), expected);

        let out = compile(true, &[("PROPERTY_COLOR", "nulls,asc")]).unwrap();
        assert_eq!(out[0]["_script"]["script"]["params"]["empty"], json!(""));
    }

    #[test]
    fn test_alias_sorts_by_target() {
        assert_eq!(
            compile(true, &[("SECTION_ID", "desc")]).unwrap(),
            json!([{"ID": {"order": "desc"}}])
        );
    }

    #[test]
    fn test_strict_errors() {
        assert_eq!(
            compile(true, &[("NOPE", "asc")]),
            Err(Error::UnknownProperty("NOPE".to_string()))
        );
        assert_eq!(
            compile(true, &[("ID", "sideways")]),
            Err(Error::InvalidSortFormat("sideways".to_string()))
        );
    }

    #[test]
    fn test_lenient_drops_bad_entries() {
        assert_eq!(
            compile(false, &[("NOPE", "asc"), ("ID", "sideways"), ("SORT", "desc")]).unwrap(),
            json!([{"SORT": {"order": "desc"}}])
        );
    }

    #[test]
    fn test_compile_map() {
        let sort = json!({"SORT": "asc", "ID": 5});
        let compiler = SortCompiler::new(false);
        let clauses = compiler
            .compile_map(&schema(), sort.as_object().unwrap())
            .unwrap();
        assert_eq!(clauses, vec![SortClause::field("SORT", SortOrder::Asc, None)]);

        assert!(SortCompiler::new(true)
            .compile_map(&schema(), sort.as_object().unwrap())
            .is_err());
    }
}
