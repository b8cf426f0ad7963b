//! Registration-time checks.
//!
//! Every check is a free function over the data it inspects. Backend
//! hooks are passed in as [`VersionCatalog`] / [`DataStoreValidator`].

use crate::backend::{DataStoreValidator, VersionCatalog};
use crate::error::{MetadataError, MetadataResult};
use docmeta_model::{EntityInfo, EntityMetadata, EntitySchema, RoleMap, SchemaStatus, Version};
use regex_lite::Regex;
use std::sync::OnceLock;

/// `MAJOR.MINOR.PATCH[-qualifier]`
pub const SEMVER_PATTERN: &str = r"^\d+\.\d+\.\d+(-.*)?$";

fn semver() -> &'static Regex {
    static SEMVER: OnceLock<Regex> = OnceLock::new();
    SEMVER.get_or_init(|| Regex::new(SEMVER_PATTERN).expect("semver pattern compiles"))
}

/// Returns the version unchanged if its value is a semantic version.
pub fn check_version_is_valid(version: &Version) -> MetadataResult<&Version> {
    if version.value.is_empty() {
        return Err(MetadataError::InvalidVersion);
    }
    if !semver().is_match(&version.value) {
        return Err(MetadataError::InvalidVersionNumber(version.value.clone()));
    }
    Ok(version)
}

/// No-op without a default version; otherwise the catalog must know it.
pub fn validate_default_version(info: &EntityInfo, catalog: &dyn VersionCatalog) -> MetadataResult<()> {
    match &info.default_version {
        Some(default) if !catalog.check_version_exists(&info.name, default) => Err(
            MetadataError::InvalidDefaultVersion(format!("{}:{}", info.name, default)),
        ),
        _ => Ok(()),
    }
}

pub fn check_metadata_has_name(info: &EntityInfo) -> MetadataResult<()> {
    if info.name.is_empty() {
        return Err(MetadataError::EmptyMetadataName);
    }
    Ok(())
}

pub fn check_metadata_has_fields(schema: &EntitySchema) -> MetadataResult<()> {
    if schema.fields().is_empty() {
        return Err(MetadataError::MetadataWithNoFields(schema.name().to_string()));
    }
    Ok(())
}

pub fn check_datastore_is_valid(info: &EntityInfo, validator: &dyn DataStoreValidator) -> MetadataResult<()> {
    validator
        .check_datastore_is_valid(info)
        .map_err(|reason| MetadataError::DataStoreInvalid {
            entity: info.name.clone(),
            reason,
        })
}

/// Schema and info must describe the same entity.
pub fn check_names_agree(metadata: &EntityMetadata) -> MetadataResult<()> {
    if metadata.schema.name() != metadata.info.name {
        return Err(MetadataError::InvalidArgument(format!(
            "schema name '{}' does not match entity name '{}'",
            metadata.schema.name(),
            metadata.info.name
        )));
    }
    Ok(())
}

/// Folds entity-level and field-level access declarations into a role map.
///
/// Entity-level grants are recorded under the entity name, field-level
/// grants under `entity.field.path`.
pub fn collect_roles(entity_name: &str, schema: &EntitySchema) -> RoleMap {
    let mut roles = RoleMap::new();
    for (operation, granted) in schema.access() {
        roles.add_roles(granted, *operation, entity_name);
    }
    let fields = schema.fields();
    for id in fields.iter() {
        let access = fields.node(id).access();
        if access.is_empty() {
            continue;
        }
        let path = format!("{entity_name}.{}", fields.full_path(id));
        for (operation, granted) in access {
            roles.add_roles(granted, *operation, &path);
        }
    }
    roles
}

/// Metadata that has passed every registration check.
///
/// Only [`validate`] constructs this, so only validated metadata can be published.
#[derive(Debug, Clone)]
pub struct Validated(EntityMetadata);

impl Validated {
    pub fn metadata(&self) -> &EntityMetadata {
        &self.0
    }

    pub fn into_inner(self) -> EntityMetadata {
        self.0
    }
}

/// Runs every check in order and moves the schema to `validated`.
///
/// The first failure aborts; nothing is partially applied.
pub fn validate(
    mut metadata: EntityMetadata,
    catalog: &dyn VersionCatalog,
    datastore: &dyn DataStoreValidator,
) -> MetadataResult<Validated> {
    check_metadata_has_name(&metadata.info)?;
    check_names_agree(&metadata)?;
    check_version_is_valid(metadata.schema.version())?;
    check_metadata_has_fields(&metadata.schema)?;
    check_datastore_is_valid(&metadata.info, datastore)?;
    validate_default_version(&metadata.info, catalog)?;
    metadata.schema.transition(SchemaStatus::Validated)?;
    Ok(Validated(metadata))
}
