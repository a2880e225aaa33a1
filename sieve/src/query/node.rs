use super::key::Operator;
use crate::schema::PropertyKind;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Reserved key marking a nested object as a filter group
pub const LOGIC_KEY: &str = "LOGIC";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    /// Case-insensitive `AND` / `OR`
    pub fn parse(value: &Value) -> Result<Self> {
        match value.as_str().map(str::to_ascii_uppercase).as_deref() {
            Some("AND") => Ok(Self::And),
            Some("OR") => Ok(Self::Or),
            _ => Err(Error::InvalidLogic(match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized condition: operator, canonical field and normalized value
#[derive(Debug, Clone, PartialEq)]
pub struct FilterLeaf {
    pub operator: Operator,
    pub field: String,
    pub kind: PropertyKind,
    pub value: Value,
}

impl FilterLeaf {
    /// Whether the value asks for a missing field rather than a concrete value.
    ///
    /// Both `null` and `false` do, whatever the field's kind.
    pub fn is_empty_value(&self) -> bool {
        matches!(self.value, Value::Null | Value::Bool(false))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterGroup {
    pub logic: Logic,
    pub children: Vec<FilterNode>,
}

impl FilterGroup {
    pub fn new(logic: Logic) -> Self {
        Self {
            logic,
            children: Vec::new(),
        }
    }
}

/// Normalized filter tree, isomorphic to the raw filter it came from
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Leaf(FilterLeaf),
    Group(FilterGroup),
}

impl FilterNode {
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group(group) => group.children.iter().map(Self::leaf_count).sum(),
        }
    }

    pub fn as_group(&self) -> Option<&FilterGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_logic_is_case_insensitive() {
        assert_eq!(Logic::parse(&json!("or")).unwrap(), Logic::Or);
        assert_eq!(Logic::parse(&json!("And")).unwrap(), Logic::And);
    }

    #[test]
    fn test_invalid_logic() {
        assert_eq!(
            Logic::parse(&json!("XOR")),
            Err(Error::InvalidLogic("XOR".to_string()))
        );
        assert!(matches!(Logic::parse(&json!(1)), Err(Error::InvalidLogic(_))));
    }

    #[test]
    fn test_null_and_false_are_empty() {
        let mut leaf = FilterLeaf {
            operator: Operator::Equals,
            field: "ACTIVE".to_string(),
            kind: PropertyKind::Boolean,
            value: json!(false),
        };
        assert!(leaf.is_empty_value());
        leaf.value = Value::Null;
        assert!(leaf.is_empty_value());
        leaf.value = json!(true);
        assert!(!leaf.is_empty_value());
        leaf.kind = PropertyKind::Keyword;
        leaf.value = json!("");
        assert!(!leaf.is_empty_value());
    }
}
