//! Error types for the metadata registry.

use docmeta_model::{FieldTreeError, ModelError};
use thiserror::Error;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("empty metadata name")]
    EmptyMetadataName,

    #[error("metadata with no fields: {0}")]
    MetadataWithNoFields(String),

    #[error("invalid version: version is empty")]
    InvalidVersion,

    #[error("invalid version number: {0}")]
    InvalidVersionNumber(String),

    #[error("invalid default version: {0}")]
    InvalidDefaultVersion(String),

    #[error("data store invalid for entity '{entity}': {reason}")]
    DataStoreInvalid { entity: String, reason: String },

    #[error("duplicate version: {0}")]
    DuplicateVersion(String),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("version not found: {0}")]
    VersionNotFound(String),

    #[error("no default version for entity: {0}")]
    NoDefaultVersion(String),

    #[error("unknown type '{type_name}' for field '{field}'")]
    UnknownType { field: String, type_name: String },

    #[error("malformed metadata: {0}")]
    Malformed(String),

    #[error(transparent)]
    FieldTree(#[from] FieldTreeError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<serde_json::Error> for MetadataError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
