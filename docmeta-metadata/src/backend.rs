//! Backend-specific hooks consumed by validation.
//!
//! A storage connector answers two questions: does a version exist, and is
//! an entity's data-store binding acceptable. Both are injected; plain
//! closures implement the traits for ad-hoc use.

use docmeta_model::EntityInfo;
use std::collections::BTreeSet;

/// Answers version-existence queries.
pub trait VersionCatalog {
    fn check_version_exists(&self, entity_name: &str, version: &str) -> bool;
}

/// Decides whether an entity's data-store binding is usable.
///
/// The reason string is backend-defined; callers surface it as
/// [`MetadataError::DataStoreInvalid`](crate::MetadataError::DataStoreInvalid).
pub trait DataStoreValidator: Send + Sync {
    fn check_datastore_is_valid(&self, info: &EntityInfo) -> Result<(), String>;
}

impl<F> VersionCatalog for F
where
    F: Fn(&str, &str) -> bool,
{
    fn check_version_exists(&self, entity_name: &str, version: &str) -> bool {
        self(entity_name, version)
    }
}

impl<F> DataStoreValidator for F
where
    F: Fn(&EntityInfo) -> Result<(), String> + Send + Sync,
{
    fn check_datastore_is_valid(&self, info: &EntityInfo) -> Result<(), String> {
        self(info)
    }
}

/// An entity's own list of known versions.
impl VersionCatalog for EntityInfo {
    fn check_version_exists(&self, entity_name: &str, version: &str) -> bool {
        self.name == entity_name && self.has_version(version)
    }
}

/// Accepts bindings whose `backend` is in a fixed set.
#[derive(Debug, Clone, Default)]
pub struct AcceptedBackends {
    backends: BTreeSet<String>,
}

impl AcceptedBackends {
    pub fn new<I, S>(backends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            backends: backends.into_iter().map(Into::into).collect(),
        }
    }

    pub fn accepts(&self, backend: &str) -> bool {
        self.backends.contains(backend)
    }
}

impl DataStoreValidator for AcceptedBackends {
    fn check_datastore_is_valid(&self, info: &EntityInfo) -> Result<(), String> {
        let backend = info.datastore.backend.as_str();
        if backend.is_empty() {
            return Err("no backend specified".to_string());
        }
        if !self.accepts(backend) {
            return Err(format!("unsupported backend '{backend}'"));
        }
        Ok(())
    }
}
