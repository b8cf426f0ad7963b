//! Error types for projector compilation.

use thiserror::Error;

/// Result type for projection operations.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Raised while building a projector tree. Evaluation itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("invalid projection path: {0}")]
    InvalidPath(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("context node for '{0}' is not part of the field tree")]
    UnknownContext(String),

    #[error("expected array field: {0}")]
    ExpectedArrayField(String),

    #[error("invalid range [{from}, {to}] for field {field}")]
    InvalidRange { field: String, from: usize, to: usize },

    #[error("malformed projection: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProjectionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
