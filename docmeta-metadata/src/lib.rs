//! Entity metadata registry for docmeta.
//!
//! Validates submitted entity versions, publishes them as shared immutable
//! schemas, and answers lookups by name and version.
//!
//! Backend-specific checks (version existence, data-store bindings) are
//! injected through [`VersionCatalog`] and [`DataStoreValidator`].

mod backend;
mod config;
mod error;
mod json_schema;
mod parser;
mod registry;
mod validate;

pub use backend::{AcceptedBackends, DataStoreValidator, VersionCatalog};
pub use config::MetadataConfig;
pub use error::{MetadataError, MetadataResult};
pub use json_schema::{DRAFT_04, derive as derive_json_schema};
pub use parser::{parse_metadata, parse_metadata_list};
pub use registry::MetadataRegistry;
pub use validate::{
    SEMVER_PATTERN, Validated, check_datastore_is_valid, check_metadata_has_fields,
    check_metadata_has_name, check_names_agree, check_version_is_valid, collect_roles, validate,
    validate_default_version,
};
