use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Index-side type of a schema field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyKind {
    #[default]
    Keyword,
    Text,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    Alias,
    /// Any other index type (object, nested, geo_point, ...). Values pass through untouched.
    Other(String),
}

impl PropertyKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Keyword => "keyword",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Alias => "alias",
            Self::Other(s) => s,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, Self::Alias)
    }

    /// Value treated as "empty" when ordering nulls first or last.
    ///
    /// `None` means only a missing value counts as empty (dates, and types
    /// without a meaningful zero value).
    pub fn empty_value(&self) -> Option<Value> {
        match self {
            Self::Integer | Self::Long => Some(Value::from(0)),
            Self::Float | Self::Double => Some(Value::from(0.0)),
            Self::Boolean => Some(Value::Bool(false)),
            Self::Keyword | Self::Text => Some(Value::String(String::new())),
            Self::Date | Self::Alias | Self::Other(_) => None,
        }
    }
}

impl From<&str> for PropertyKind {
    fn from(s: &str) -> Self {
        match s {
            "keyword" => Self::Keyword,
            "text" => Self::Text,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "alias" => Self::Alias,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PropertyKind {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PropertyKind> for String {
    fn from(kind: PropertyKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
