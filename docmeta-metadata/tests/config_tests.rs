use docmeta_metadata::{DRAFT_04, MetadataConfig};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[metadata]
accepted-backends = ["rdbms", "memory"]
json-schema-dialect = "http://json-schema.org/draft-07/schema#"
"#
    )
    .unwrap();

    let config = MetadataConfig::load_from(file.path());
    assert_eq!(config.accepted_backends, vec!["rdbms", "memory"]);
    assert_eq!(config.json_schema_dialect, "http://json-schema.org/draft-07/schema#");
    assert!(config.datastore_validator().accepts("rdbms"));
    assert!(!config.datastore_validator().accepts("mongo"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = MetadataConfig::load_from(&dir.path().join("absent.toml"));
    assert_eq!(config, MetadataConfig::default());
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[metadata\naccepted-backends = 3").unwrap();
    assert_eq!(MetadataConfig::load_from(file.path()), MetadataConfig::default());
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config = MetadataConfig::from_toml_str("[metadata]\naccepted-backends = []\n").unwrap();
    assert!(config.accepted_backends.is_empty());
    assert_eq!(config.json_schema_dialect, DRAFT_04);
}
