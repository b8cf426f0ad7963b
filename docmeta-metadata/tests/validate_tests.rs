//! Registration checks, exercised as free functions.

use docmeta_metadata::{
    AcceptedBackends, MetadataError, check_datastore_is_valid, check_metadata_has_fields,
    check_metadata_has_name, check_names_agree, check_version_is_valid, collect_roles, validate,
    validate_default_version,
};
use docmeta_model::{
    Access, DataStore, EntityInfo, EntityMetadata, EntitySchema, FieldTree, Operation,
    SchemaStatus, TypeRegistry, Version,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn order_info() -> EntityInfo {
    EntityInfo::new("Order", DataStore::new("mongo"))
        .with_version("1.0.0")
        .with_version("1.1.0")
}

fn order_schema() -> EntitySchema {
    let types = TypeRegistry::with_defaults();
    let mut tree = FieldTree::new();
    tree.add_simple(tree.root(), "id", types.get("uid").unwrap()).unwrap();
    let address = tree.add_object(tree.root(), "address").unwrap();
    let city = tree.add_simple(address, "city", types.get("string").unwrap()).unwrap();
    tree.add_access(city, Operation::Update, ["clerk"]);
    let mut access = Access::new();
    access.insert(Operation::Find, vec!["anyone".into(), "clerk".into()]);
    EntitySchema::new("Order", Version::new("1.0.0"), tree).with_access(access)
}

fn mongo_only() -> AcceptedBackends {
    AcceptedBackends::new(["mongo"])
}

// ── Version syntax ───────────────────────────────────────────────

#[test]
fn version_accepts_qualifier() {
    let v = Version::new("1.2.3-SNAPSHOT");
    assert_eq!(check_version_is_valid(&v).unwrap(), &v);
}

#[test]
fn empty_version_is_invalid_version() {
    assert_eq!(
        check_version_is_valid(&Version::new("")),
        Err(MetadataError::InvalidVersion)
    );
}

#[test]
fn two_part_version_is_invalid_number() {
    assert_eq!(
        check_version_is_valid(&Version::new("1.0")),
        Err(MetadataError::InvalidVersionNumber("1.0".into()))
    );
}

proptest! {
    #[test]
    fn semantic_versions_pass_unchanged(
        major in 0u32..10_000,
        minor in 0u32..10_000,
        patch in 0u32..10_000,
        qualifier in proptest::option::of("[A-Za-z0-9.]{0,8}"),
    ) {
        let value = match qualifier {
            Some(q) => format!("{major}.{minor}.{patch}-{q}"),
            None => format!("{major}.{minor}.{patch}"),
        };
        let version = Version::new(value);
        prop_assert_eq!(check_version_is_valid(&version).unwrap(), &version);
    }

    #[test]
    fn non_numeric_versions_fail_with_invalid_number(value in "[a-z.\\-]{1,12}") {
        let version = Version::new(value.clone());
        prop_assert_eq!(
            check_version_is_valid(&version),
            Err(MetadataError::InvalidVersionNumber(value))
        );
    }
}

// ── Default version ──────────────────────────────────────────────

#[test]
fn no_default_version_is_noop() {
    let info = order_info();
    assert!(validate_default_version(&info, &info).is_ok());
}

#[test]
fn known_default_version_passes() {
    let info = order_info().with_default_version("1.1.0");
    assert!(validate_default_version(&info, &info).is_ok());
}

#[test]
fn unknown_default_version_names_entity_and_version() {
    let info = order_info().with_default_version("2.0.0");
    let err = validate_default_version(&info, &info).unwrap_err();
    assert_eq!(err, MetadataError::InvalidDefaultVersion("Order:2.0.0".into()));
    assert!(err.to_string().contains("Order:2.0.0"));
}

#[test]
fn default_version_uses_injected_catalog() {
    let info = EntityInfo::new("Order", DataStore::new("mongo")).with_default_version("9.9.9");
    let everything = |_: &str, _: &str| true;
    assert!(validate_default_version(&info, &everything).is_ok());
}

// ── Name, fields, data store ─────────────────────────────────────

#[test]
fn empty_name_is_rejected() {
    let info = EntityInfo::new("", DataStore::new("mongo"));
    assert_eq!(check_metadata_has_name(&info), Err(MetadataError::EmptyMetadataName));
}

#[test]
fn schema_without_fields_is_rejected() {
    let schema = EntitySchema::new("Order", Version::new("1.0.0"), FieldTree::new());
    assert_eq!(
        check_metadata_has_fields(&schema),
        Err(MetadataError::MetadataWithNoFields("Order".into()))
    );
}

#[test]
fn datastore_failure_is_surfaced() {
    let info = EntityInfo::new("Order", DataStore::new("rdbms"));
    assert_eq!(
        check_datastore_is_valid(&info, &mongo_only()),
        Err(MetadataError::DataStoreInvalid {
            entity: "Order".into(),
            reason: "unsupported backend 'rdbms'".into(),
        })
    );
}

#[test]
fn mismatched_names_are_rejected() {
    let metadata = EntityMetadata::new(
        EntityInfo::new("Invoice", DataStore::new("mongo")),
        order_schema(),
    );
    assert!(matches!(
        check_names_agree(&metadata),
        Err(MetadataError::InvalidArgument(_))
    ));
}

// ── validate() ───────────────────────────────────────────────────

#[test]
fn validate_moves_schema_to_validated() {
    let info = order_info().with_default_version("1.1.0");
    let catalog = info.clone();
    let validated = validate(EntityMetadata::new(info, order_schema()), &catalog, &mongo_only()).unwrap();
    assert_eq!(validated.metadata().schema.status(), SchemaStatus::Validated);
}

#[test]
fn validate_stops_at_first_failure() {
    let info = EntityInfo::new("Order", DataStore::new("rdbms")).with_default_version("2.0.0");
    let catalog = info.clone();
    let schema = EntitySchema::new("Order", Version::new("1.0"), FieldTree::new());
    let err = validate(EntityMetadata::new(info, schema), &catalog, &mongo_only()).unwrap_err();
    assert_eq!(err, MetadataError::InvalidVersionNumber("1.0".into()));
}

#[test]
fn validate_rejects_unknown_default() {
    let info = order_info().with_default_version("2.0.0");
    let catalog = info.clone();
    let err = validate(EntityMetadata::new(info, order_schema()), &catalog, &mongo_only()).unwrap_err();
    assert!(err.to_string().contains("Order:2.0.0"));
}

// ── Role collection ──────────────────────────────────────────────

#[test]
fn collect_roles_uses_entity_and_field_paths() {
    let roles = collect_roles("Order", &order_schema());
    assert_eq!(roles.paths("anyone", Operation::Find), ["Order"]);
    assert_eq!(roles.paths("clerk", Operation::Find), ["Order"]);
    assert_eq!(roles.paths("clerk", Operation::Update), ["Order.address.city"]);
    assert!(roles.paths("anyone", Operation::Delete).is_empty());
}
