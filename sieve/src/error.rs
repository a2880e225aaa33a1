use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid filter key: {0:?}")]
    InvalidFilterKey(String),

    #[error("Property not found in schema: {0}")]
    UnknownProperty(String),

    #[error("Alias {property} has an invalid path: {}", path.as_deref().unwrap_or("<missing>"))]
    InvalidAliasPath {
        property: String,
        path: Option<String>,
    },

    #[error("Cannot filter {field} by operator {operator:?}")]
    InvalidOperator { field: String, operator: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid sort format: {0:?}")]
    InvalidSortFormat(String),

    #[error("Invalid logic operator: {0:?}")]
    InvalidLogic(String),

    #[error("Schema error: {0}")]
    Schema(String),
}

impl Error {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFilterKey(_) => "invalid_filter_key",
            Self::UnknownProperty(_) => "unknown_property",
            Self::InvalidAliasPath { .. } => "invalid_alias_path",
            Self::InvalidOperator { .. } => "invalid_operator",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::InvalidSortFormat(_) => "invalid_sort_format",
            Self::InvalidLogic(_) => "invalid_logic",
            Self::Schema(_) => "schema",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
