//! Registry configuration, read from a `docmeta.toml` file.
//!
//! ```toml
//! [metadata]
//! accepted-backends = ["mongo", "memory"]
//! json-schema-dialect = "http://json-schema.org/draft-04/schema#"
//! ```

use crate::backend::AcceptedBackends;
use crate::json_schema::DRAFT_04;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Settings consumed by [`MetadataRegistry`](crate::MetadataRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Data-store backends the bundled validator accepts.
    #[serde(default = "default_backends")]
    pub accepted_backends: Vec<String>,
    /// `$schema` URI written by JSON-Schema derivation.
    #[serde(default = "default_dialect")]
    pub json_schema_dialect: String,
}

fn default_backends() -> Vec<String> {
    vec!["mongo".to_string(), "memory".to_string()]
}

fn default_dialect() -> String {
    DRAFT_04.to_string()
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            accepted_backends: default_backends(),
            json_schema_dialect: default_dialect(),
        }
    }
}

impl MetadataConfig {
    /// Loads configuration from `path`.
    /// Falls back to defaults when the file is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded metadata config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse config file {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parses the TOML layout shown in the module docs.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ConfigFile>(contents).map(ConfigFile::into_config)
    }

    /// The data-store validator described by this configuration.
    pub fn datastore_validator(&self) -> AcceptedBackends {
        AcceptedBackends::new(self.accepted_backends.iter().cloned())
    }
}

/// Raw TOML structure matching the config file format.
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    metadata: MetadataSection,
}

#[derive(Deserialize)]
struct MetadataSection {
    #[serde(default = "default_backends", rename = "accepted-backends")]
    accepted_backends: Vec<String>,
    #[serde(default = "default_dialect", rename = "json-schema-dialect")]
    json_schema_dialect: String,
}

impl Default for MetadataSection {
    fn default() -> Self {
        Self {
            accepted_backends: default_backends(),
            json_schema_dialect: default_dialect(),
        }
    }
}

impl ConfigFile {
    fn into_config(self) -> MetadataConfig {
        MetadataConfig {
            accepted_backends: self.metadata.accepted_backends,
            json_schema_dialect: self.metadata.json_schema_dialect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_accept_mongo_and_memory() {
        let config = MetadataConfig::default();
        let validator = config.datastore_validator();
        assert!(validator.accepts("mongo"));
        assert!(validator.accepts("memory"));
        assert!(!validator.accepts("rdbms"));
        assert_eq!(config.json_schema_dialect, DRAFT_04);
    }

    #[test]
    fn parse_config_toml() {
        let config = MetadataConfig::from_toml_str(
            r#"
[metadata]
accepted-backends = ["rdbms"]
"#,
        )
        .unwrap();
        assert_eq!(config.accepted_backends, vec!["rdbms"]);
        assert_eq!(config.json_schema_dialect, DRAFT_04);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(MetadataConfig::from_toml_str("").unwrap(), MetadataConfig::default());
    }
}
