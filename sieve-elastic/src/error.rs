use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElasticError {
    #[error("Connection failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Elasticsearch returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Malformed {what} response: {reason}")]
    Malformed { what: &'static str, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Compile(#[from] sieve::Error),
}

impl ElasticError {
    pub(crate) fn malformed(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            what,
            reason: reason.into(),
        }
    }

    /// HTTP status of a non-success response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IndexNotFound(_)) || self.status() == Some(404)
    }
}
