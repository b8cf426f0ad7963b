use crate::error::ModelError;
use crate::field::{FieldTree, NodeId};
use crate::roles::{Access, RoleMap};
use docmeta_types::Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Schema version record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Semantic version, `MAJOR.MINOR.PATCH[-qualifier]`.
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends_versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
}

impl Version {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            extends_versions: Vec::new(),
            changelog: None,
        }
    }
}

/// Lifecycle of an entity version: proposed → validated → published → retired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaStatus {
    #[default]
    Proposed,
    Validated,
    Published,
    Retired,
}

impl SchemaStatus {
    pub fn can_transition_to(self, next: SchemaStatus) -> bool {
        matches!(
            (self, next),
            (Self::Proposed, Self::Validated)
                | (Self::Validated, Self::Published)
                | (Self::Published, Self::Retired)
        )
    }
}

impl fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Proposed => "proposed",
            Self::Validated => "validated",
            Self::Published => "published",
            Self::Retired => "retired",
        };
        f.write_str(s)
    }
}

/// One version of an entity's shape.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: String,
    version: Version,
    status: SchemaStatus,
    fields: FieldTree,
    access: Access,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>, version: Version, fields: FieldTree) -> Self {
        Self {
            name: name.into(),
            version,
            status: SchemaStatus::Proposed,
            fields,
            access: Access::new(),
        }
    }

    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn status(&self) -> SchemaStatus {
        self.status
    }

    pub fn fields(&self) -> &FieldTree {
        &self.fields
    }

    pub fn field_tree_root(&self) -> NodeId {
        self.fields.root()
    }

    /// Entity-level roles per operation.
    pub fn access(&self) -> &Access {
        &self.access
    }

    /// Full paths of every leaf carrying a `required` constraint, in declaration order.
    pub fn required_fields(&self) -> Vec<Path> {
        let mut required = Vec::new();
        let mut pending = vec![self.fields.children(self.fields.root())];
        while let Some(children) = pending.last_mut() {
            let Some(id) = children.next() else {
                pending.pop();
                continue;
            };
            if self.fields.node(id).is_required() {
                required.push(self.fields.full_path(id));
            }
            if self.fields.num_children(id) > 0 {
                pending.push(self.fields.children(id));
            }
        }
        required
    }

    /// Moves to `next` if the lifecycle allows it.
    pub fn transition(&mut self, next: SchemaStatus) -> Result<(), ModelError> {
        if !self.status.can_transition_to(next) {
            return Err(ModelError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Backend binding for an entity. Backend-specific keys are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStore {
    pub backend: String,
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl DataStore {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            properties: serde_json::Map::new(),
        }
    }
}

/// Version-independent facts about an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInfo {
    pub name: String,
    #[serde(default)]
    pub versions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,
    pub datastore: DataStore,
    #[serde(default, skip_serializing_if = "RoleMap::is_empty")]
    pub roles: RoleMap,
}

impl EntityInfo {
    pub fn new(name: impl Into<String>, datastore: DataStore) -> Self {
        Self {
            name: name.into(),
            versions: BTreeSet::new(),
            default_version: None,
            datastore,
            roles: RoleMap::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.versions.insert(version.into());
        self
    }

    #[must_use]
    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = Some(version.into());
        self
    }

    pub fn has_version(&self, version: &str) -> bool {
        self.versions.contains(version)
    }
}

/// An info/schema pair as submitted for registration.
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    pub info: EntityInfo,
    pub schema: EntitySchema,
}

impl EntityMetadata {
    pub fn new(info: EntityInfo, schema: EntitySchema) -> Self {
        Self { info, schema }
    }

    /// `name:version`, as used in error messages and logs.
    pub fn key(&self) -> String {
        format!("{}:{}", self.info.name, self.schema.version().value)
    }
}
