//! Commands behind the `docmeta` binary.
//!
//! Each command takes a loaded [`MetadataRegistry`] and returns the JSON it
//! prints, so the binary only handles arguments, files and logging.

use anyhow::{Context, Result};
use docmeta_metadata::{MetadataConfig, MetadataRegistry, parse_metadata_list};
use docmeta_model::{SchemaStatus, TypeRegistry};
use docmeta_projection::{Projection, compile, project_document};
use docmeta_types::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use tracing::{debug, info};

/// One registered entity, as printed by `docmeta entities`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub name: String,
    pub versions: Vec<VersionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,
    pub backend: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VersionSummary {
    pub version: String,
    pub status: SchemaStatus,
}

/// Reads a JSON file.
pub fn read_json(path: &std::path::Path) -> Result<Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parses every metadata document in `metadata` and registers it.
pub fn load_registry(config: MetadataConfig, metadata: &Value) -> Result<MetadataRegistry> {
    let types = TypeRegistry::with_defaults();
    let mut registry = MetadataRegistry::from_config(config);
    for entry in parse_metadata_list(metadata, &types).context("Failed to parse metadata")? {
        let key = entry.key();
        registry
            .register(entry)
            .with_context(|| format!("Failed to register {key}"))?;
    }
    info!("Loaded {} entities", registry.len());
    Ok(registry)
}

pub fn entities(registry: &MetadataRegistry) -> Result<Vec<EntitySummary>> {
    registry
        .entity_names()
        .map(|name| -> Result<EntitySummary> {
            let info = registry.entity_info(name)?;
            let versions = registry
                .versions(name)?
                .into_iter()
                .map(|(version, status)| VersionSummary {
                    version: version.to_string(),
                    status,
                })
                .collect();
            Ok(EntitySummary {
                name: name.to_string(),
                versions,
                default_version: info.default_version.clone(),
                backend: info.datastore.backend.clone(),
            })
        })
        .collect()
}

pub fn json_schema(registry: &MetadataRegistry, entity: &str, version: Option<&str>) -> Result<Value> {
    Ok(registry.json_schema(entity, version)?)
}

pub fn roles(registry: &MetadataRegistry) -> Result<Value> {
    Ok(serde_json::to_value(registry.mapped_roles())?)
}

/// Projects `document` with `projection`, compiled against the entity's field tree.
pub fn project(
    registry: &MetadataRegistry,
    entity: &str,
    version: Option<&str>,
    projection: &Value,
    document: &Value,
) -> Result<Value> {
    let schema = registry.resolve(entity, version)?;
    let projection = Projection::from_json(projection).context("Invalid projection")?;
    let fields = schema.fields();
    let projector = compile(&projection, &Path::empty(), fields, fields.root())
        .context("Failed to compile projection")?;
    debug!(entity = %entity, version = %schema.version().value, "Projecting document");

    match document {
        Value::Array(documents) => documents
            .iter()
            .map(|doc| project_document(&*projector, fields, doc).map_err(anyhow::Error::from))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        doc => Ok(project_document(&*projector, fields, doc)?),
    }
}
