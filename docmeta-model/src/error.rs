//! Error types for the schema model.

use crate::SchemaStatus;
use thiserror::Error;

/// Result type for type-system operations.
pub type TypeResult<T> = Result<T, TypeError>;

/// Result type for field tree construction.
pub type FieldTreeResult<T> = Result<T, FieldTreeError>;

/// Errors raised by [`Type`](crate::Type) implementations and the type registry.
///
/// `Unsupported` is a programming error (asking a container for a scalar
/// conversion); `InvalidValue` is a data error. Callers must not conflate them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unsupported operation: {operation} on type '{type_name}'")]
    Unsupported {
        type_name: String,
        operation: &'static str,
    },

    #[error("invalid value for type '{type_name}': {detail}")]
    InvalidValue { type_name: String, detail: String },

    #[error("type already registered: {0}")]
    AlreadyRegistered(String),
}

/// Structural errors while building a field tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldTreeError {
    #[error("empty field name under '{0}'")]
    EmptyName(String),

    #[error("invalid field name: {0}")]
    InvalidName(String),

    #[error("duplicate field: {0}")]
    DuplicateField(String),

    #[error("not a composite field: {0}")]
    NotComposite(String),

    #[error("not a simple field: {0}")]
    NotSimple(String),
}

/// Errors that can occur in model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    FieldTree(#[from] FieldTreeError),

    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: SchemaStatus,
        to: SchemaStatus,
    },
}
