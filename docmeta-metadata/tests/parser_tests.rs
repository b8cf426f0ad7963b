use docmeta_metadata::{MetadataError, MetadataRegistry, parse_metadata, parse_metadata_list};
use docmeta_model::{FieldConstraint, NodeKind, Operation, TypeRegistry};
use docmeta_types::Path;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn order_document() -> Value {
    json!({
        "entityInfo": {
            "name": "Order",
            "defaultVersion": "1.0.0",
            "datastore": {"backend": "mongo", "collection": "orders"}
        },
        "schema": {
            "name": "Order",
            "version": {"value": "1.0.0", "changelog": "initial"},
            "access": {"find": ["anyone"], "insert": ["clerk"]},
            "fields": {
                "id": {"type": "uid", "constraints": {"required": true}},
                "address": {
                    "type": "object",
                    "fields": {
                        "city": {"type": "string", "access": {"update": ["clerk"]}}
                    }
                },
                "tags": {"type": "array", "items": {"type": "string"}},
                "lines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "fields": {
                            "sku": {"type": "string", "constraints": {"maxLength": 12, "matches": "^[A-Z]+$"}},
                            "qty": {"type": "integer", "constraints": {"minimum": 1}}
                        }
                    }
                }
            }
        }
    })
}

#[test]
fn parses_info_and_version() {
    let metadata = parse_metadata(&order_document(), &TypeRegistry::with_defaults()).unwrap();
    assert_eq!(metadata.info.name, "Order");
    assert_eq!(metadata.info.default_version.as_deref(), Some("1.0.0"));
    assert!(metadata.info.has_version("1.0.0"));
    assert_eq!(metadata.info.datastore.backend, "mongo");
    assert_eq!(metadata.info.datastore.properties["collection"], json!("orders"));
    assert_eq!(metadata.schema.version().changelog.as_deref(), Some("initial"));
    assert_eq!(metadata.schema.access()[&Operation::Insert], vec!["clerk"]);
}

#[test]
fn parses_field_tree() {
    let metadata = parse_metadata(&order_document(), &TypeRegistry::with_defaults()).unwrap();
    let fields = metadata.schema.fields();

    let id = fields.resolve(&Path::parse("id").unwrap()).unwrap();
    assert_eq!(fields.node(id).ty().unwrap().name(), "uid");
    assert!(fields.node(id).is_required());

    let city = fields.resolve(&Path::parse("address.city").unwrap()).unwrap();
    assert_eq!(fields.node(city).access()[&Operation::Update], vec!["clerk"]);

    let tags = fields.resolve(&Path::parse("tags").unwrap()).unwrap();
    assert!(fields.node(tags).is_array());
    let tag = fields.resolve(&Path::parse("tags.3").unwrap()).unwrap();
    assert!(matches!(fields.node(tag).kind(), NodeKind::Simple(_)));

    let sku = fields.resolve(&Path::parse("lines.*.sku").unwrap()).unwrap();
    assert_eq!(
        fields.node(sku).constraints(),
        [FieldConstraint::MaxLength(12), FieldConstraint::Matches("^[A-Z]+$".into())]
    );
    let qty = fields.resolve(&Path::parse("lines.0.qty").unwrap()).unwrap();
    assert_eq!(fields.node(qty).constraints(), [FieldConstraint::Minimum(1.0)]);
}

#[test]
fn parsed_metadata_registers() {
    let metadata = parse_metadata(&order_document(), &TypeRegistry::with_defaults()).unwrap();
    let mut registry = MetadataRegistry::new();
    registry.register(metadata).unwrap();

    let roles = registry.mapped_roles();
    assert_eq!(roles.paths("anyone", Operation::Find), ["Order"]);
    assert_eq!(roles.paths("clerk", Operation::Update), ["Order.address.city"]);
    assert_eq!(
        registry.json_schema("Order", None).unwrap()["required"],
        json!(["id"])
    );
}

#[test]
fn version_may_be_a_plain_string() {
    let mut doc = order_document();
    doc["schema"]["version"] = json!("2.0.0");
    let metadata = parse_metadata(&doc, &TypeRegistry::with_defaults()).unwrap();
    assert_eq!(metadata.schema.version().value, "2.0.0");
    assert!(metadata.info.has_version("2.0.0"));
}

#[test]
fn schema_name_defaults_to_entity_name() {
    let mut doc = order_document();
    doc["schema"].as_object_mut().unwrap().remove("name");
    let metadata = parse_metadata(&doc, &TypeRegistry::with_defaults()).unwrap();
    assert_eq!(metadata.schema.name(), "Order");
}

#[test]
fn unknown_type_is_rejected() {
    let mut doc = order_document();
    doc["schema"]["fields"]["address"]["fields"]["zip"] = json!({"type": "postcode"});
    assert_eq!(
        parse_metadata(&doc, &TypeRegistry::with_defaults()).unwrap_err(),
        MetadataError::UnknownType {
            field: "address.zip".into(),
            type_name: "postcode".into(),
        }
    );
}

#[test]
fn nested_array_items_are_rejected() {
    let mut doc = order_document();
    doc["schema"]["fields"]["matrix"] = json!({"type": "array", "items": {"type": "array"}});
    assert!(matches!(
        parse_metadata(&doc, &TypeRegistry::with_defaults()),
        Err(MetadataError::Malformed(msg)) if msg.contains("matrix.*")
    ));
}

#[test]
fn unknown_constraint_is_rejected() {
    let mut doc = order_document();
    doc["schema"]["fields"]["id"]["constraints"] = json!({"unique": true});
    assert!(matches!(
        parse_metadata(&doc, &TypeRegistry::with_defaults()),
        Err(MetadataError::Malformed(msg)) if msg.contains("unique")
    ));
}

#[test]
fn unknown_operation_is_rejected() {
    let mut doc = order_document();
    doc["schema"]["access"] = json!({"purge": ["admin"]});
    assert!(matches!(
        parse_metadata(&doc, &TypeRegistry::with_defaults()),
        Err(MetadataError::Malformed(_))
    ));
}

#[test]
fn missing_sections_are_malformed() {
    let types = TypeRegistry::with_defaults();
    assert!(matches!(
        parse_metadata(&json!({"schema": {}}), &types),
        Err(MetadataError::Malformed(_))
    ));
    assert!(matches!(
        parse_metadata(&json!([]), &types),
        Err(MetadataError::Malformed(_))
    ));
}

#[test]
fn missing_fields_parse_to_empty_tree() {
    let mut doc = order_document();
    doc["schema"].as_object_mut().unwrap().remove("fields");
    let metadata = parse_metadata(&doc, &TypeRegistry::with_defaults()).unwrap();
    assert!(metadata.schema.fields().is_empty());

    let mut registry = MetadataRegistry::new();
    assert_eq!(
        registry.register(metadata).unwrap_err(),
        MetadataError::MetadataWithNoFields("Order".into())
    );
}

#[test]
fn list_accepts_array_or_single_document() {
    let types = TypeRegistry::with_defaults();
    let mut invoice = order_document();
    invoice["entityInfo"]["name"] = json!("Invoice");
    invoice["schema"]["name"] = json!("Invoice");

    let many = parse_metadata_list(&json!([order_document(), invoice]), &types).unwrap();
    assert_eq!(
        many.iter().map(|m| m.info.name.as_str()).collect::<Vec<_>>(),
        vec!["Order", "Invoice"]
    );
    assert_eq!(parse_metadata_list(&order_document(), &types).unwrap().len(), 1);
}
