//! Central entity registry.
//!
//! Owns every registered entity version, drives the registration lifecycle
//! (validate, then publish) and answers read-path lookups. Published
//! schemas are shared as `Arc<EntitySchema>` and never mutated in place.

use crate::backend::{AcceptedBackends, DataStoreValidator, VersionCatalog};
use crate::config::MetadataConfig;
use crate::error::{MetadataError, MetadataResult};
use crate::json_schema;
use crate::validate::{self, Validated, collect_roles};
use docmeta_model::{EntityInfo, EntityMetadata, EntitySchema, RoleMap, SchemaStatus};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct EntityRecord {
    info: EntityInfo,
    /// Roles supplied with the entity info itself, before access declarations are folded in.
    declared_roles: RoleMap,
    versions: BTreeMap<String, Arc<EntitySchema>>,
}

impl EntityRecord {
    fn new(info: EntityInfo) -> Self {
        Self {
            declared_roles: info.roles.clone(),
            info,
            versions: BTreeMap::new(),
        }
    }

    fn is_live(&self, version: &str) -> bool {
        self.versions
            .get(version)
            .is_some_and(|schema| schema.status() != SchemaStatus::Retired)
    }

    /// Rebuilds `info.roles` from the declared roles plus every live version's access declarations.
    fn refresh_roles(&mut self) {
        let mut roles = self.declared_roles.clone();
        for schema in self.versions.values() {
            if schema.status() == SchemaStatus::Retired {
                continue;
            }
            roles.merge(&collect_roles(&self.info.name, schema));
        }
        self.info.roles = roles;
    }
}

/// Version catalog used while validating a submission: the registry's live
/// versions plus the one version the submission is about to publish.
/// Versions merely listed in `entityInfo.versions` do not count.
struct StagedCatalog<'a> {
    entities: &'a BTreeMap<String, EntityRecord>,
    name: &'a str,
    staged: &'a str,
}

impl VersionCatalog for StagedCatalog<'_> {
    fn check_version_exists(&self, entity_name: &str, version: &str) -> bool {
        (entity_name == self.name && version == self.staged)
            || self
                .entities
                .get(entity_name)
                .is_some_and(|r| r.is_live(version))
    }
}

/// Registry of entities and their versions.
#[derive(Debug)]
pub struct MetadataRegistry<D: DataStoreValidator = AcceptedBackends> {
    entities: BTreeMap<String, EntityRecord>,
    validator: D,
    config: MetadataConfig,
}

impl MetadataRegistry<AcceptedBackends> {
    /// Registry with the default configuration.
    pub fn new() -> Self {
        Self::from_config(MetadataConfig::default())
    }

    /// Registry whose data-store validator accepts the configured backends.
    pub fn from_config(config: MetadataConfig) -> Self {
        let validator = config.datastore_validator();
        Self::with_validator(config, validator)
    }
}

impl Default for MetadataRegistry<AcceptedBackends> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DataStoreValidator> MetadataRegistry<D> {
    pub fn with_validator(config: MetadataConfig, validator: D) -> Self {
        Self {
            entities: BTreeMap::new(),
            validator,
            config,
        }
    }

    pub fn config(&self) -> &MetadataConfig {
        &self.config
    }

    // ================================================================
    // Registration
    // ================================================================

    /// Runs every registration check against `metadata`.
    ///
    /// A default version is accepted if it names a live registered version
    /// or the version being submitted, the same rule
    /// [`set_default_version`](Self::set_default_version) applies.
    pub fn validate(&self, metadata: EntityMetadata) -> MetadataResult<Validated> {
        let key = metadata.key();
        if self.contains_version(&metadata.info.name, &metadata.schema.version().value) {
            warn!(entity = %key, "Rejected metadata: version already registered");
            return Err(MetadataError::DuplicateVersion(key));
        }

        let name = metadata.info.name.clone();
        let staged = metadata.schema.version().value.clone();
        let catalog = StagedCatalog {
            entities: &self.entities,
            name: &name,
            staged: &staged,
        };

        validate::validate(metadata, &catalog, &self.validator).inspect_err(|e| {
            warn!(entity = %key, "Rejected metadata: {}", e);
        })
    }

    /// Publishes validated metadata and returns the shared schema.
    pub fn publish(&mut self, validated: Validated) -> MetadataResult<Arc<EntitySchema>> {
        let EntityMetadata { mut info, mut schema } = validated.into_inner();
        let version = schema.version().value.clone();
        info.versions.insert(version.clone());
        let key = format!("{}:{}", info.name, version);
        if self.contains_version(&info.name, &version) {
            return Err(MetadataError::DuplicateVersion(key));
        }
        schema.transition(SchemaStatus::Published)?;
        let schema = Arc::new(schema);

        match self.entities.get_mut(&info.name) {
            Some(record) => {
                record.info.versions.extend(info.versions);
                record.info.datastore = info.datastore;
                if info.default_version.is_some() {
                    record.info.default_version = info.default_version;
                }
                record.declared_roles = info.roles;
                record.versions.insert(version.clone(), Arc::clone(&schema));
                record.refresh_roles();
            }
            None => {
                let mut record = EntityRecord::new(info);
                record.versions.insert(version.clone(), Arc::clone(&schema));
                record.refresh_roles();
                self.entities.insert(record.info.name.clone(), record);
            }
        }

        info!(entity = %key, "Entity version published");
        Ok(schema)
    }

    /// Validates and publishes in one step. Nothing is stored on failure.
    pub fn register(&mut self, metadata: EntityMetadata) -> MetadataResult<Arc<EntitySchema>> {
        let validated = self.validate(metadata)?;
        self.publish(validated)
    }

    // ================================================================
    // Lookups
    // ================================================================

    /// Resolves an entity version; `None` selects the default version.
    /// Retired versions still resolve.
    pub fn resolve(&self, name: &str, version: Option<&str>) -> MetadataResult<Arc<EntitySchema>> {
        let record = self.record(name)?;
        let version = match version {
            Some(v) => v,
            None => record
                .info
                .default_version
                .as_deref()
                .ok_or_else(|| MetadataError::NoDefaultVersion(name.to_string()))?,
        };
        debug!(entity = %name, version = %version, "Resolving entity");
        record
            .versions
            .get(version)
            .cloned()
            .ok_or_else(|| MetadataError::VersionNotFound(format!("{name}:{version}")))
    }

    pub fn entity_info(&self, name: &str) -> MetadataResult<&EntityInfo> {
        self.record(name).map(|r| &r.info)
    }

    /// Registered entity names, sorted.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Registered versions of `name` with their lifecycle status.
    pub fn versions(&self, name: &str) -> MetadataResult<Vec<(&str, SchemaStatus)>> {
        Ok(self
            .record(name)?
            .versions
            .iter()
            .map(|(v, schema)| (v.as_str(), schema.status()))
            .collect())
    }

    pub fn contains_version(&self, name: &str, version: &str) -> bool {
        self.entities
            .get(name)
            .is_some_and(|r| r.versions.contains_key(version))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Role maps of every entity concatenated in entity-name order.
    pub fn mapped_roles(&self) -> RoleMap {
        let mut roles = RoleMap::new();
        for record in self.entities.values() {
            roles.merge(&record.info.roles);
        }
        roles
    }

    /// Advisory JSON-Schema for an entity version.
    pub fn json_schema(&self, name: &str, version: Option<&str>) -> MetadataResult<Value> {
        let schema = self.resolve(name, version)?;
        Ok(json_schema::derive(&schema, &self.config.json_schema_dialect))
    }

    // ================================================================
    // Lifecycle changes
    // ================================================================

    /// Makes `version` the default. It must be registered and not retired.
    pub fn set_default_version(&mut self, name: &str, version: &str) -> MetadataResult<()> {
        let record = self.record_mut(name)?;
        if !record.is_live(version) {
            return Err(MetadataError::InvalidDefaultVersion(format!("{name}:{version}")));
        }
        record.info.default_version = Some(version.to_string());
        info!(entity = %name, version = %version, "Default version changed");
        Ok(())
    }

    /// Retires a published version. It stays resolvable but can no longer be
    /// the default; if it was, the entity is left without one.
    pub fn retire_version(&mut self, name: &str, version: &str) -> MetadataResult<Arc<EntitySchema>> {
        let record = self.record_mut(name)?;
        let current = record
            .versions
            .get(version)
            .ok_or_else(|| MetadataError::VersionNotFound(format!("{name}:{version}")))?;

        let mut retired = EntitySchema::clone(current);
        retired.transition(SchemaStatus::Retired)?;
        let retired = Arc::new(retired);
        record.versions.insert(version.to_string(), Arc::clone(&retired));

        if record.info.default_version.as_deref() == Some(version) {
            record.info.default_version = None;
            info!(entity = %name, version = %version, "Retired the default version; no default remains");
        }
        record.refresh_roles();
        info!(entity = %name, version = %version, "Entity version retired");
        Ok(retired)
    }

    /// Deletes a version. Removing the last version removes the entity.
    pub fn remove_version(&mut self, name: &str, version: &str) -> MetadataResult<Arc<EntitySchema>> {
        let record = self.record_mut(name)?;
        let removed = record
            .versions
            .remove(version)
            .ok_or_else(|| MetadataError::VersionNotFound(format!("{name}:{version}")))?;
        record.info.versions.remove(version);
        if record.info.default_version.as_deref() == Some(version) {
            record.info.default_version = None;
        }
        record.refresh_roles();

        if record.versions.is_empty() {
            self.entities.remove(name);
            info!(entity = %name, "Removed last version; entity deleted");
        }
        info!(entity = %name, version = %version, "Entity version removed");
        Ok(removed)
    }

    fn record(&self, name: &str) -> MetadataResult<&EntityRecord> {
        self.entities
            .get(name)
            .ok_or_else(|| MetadataError::EntityNotFound(name.to_string()))
    }

    fn record_mut(&mut self, name: &str) -> MetadataResult<&mut EntityRecord> {
        self.entities
            .get_mut(name)
            .ok_or_else(|| MetadataError::EntityNotFound(name.to_string()))
    }
}
