//! Reads entity metadata documents into [`EntityMetadata`].
//!
//! Document shape:
//!
//! ```json
//! {
//!   "entityInfo": { "name": "Order", "defaultVersion": "1.0.0", "datastore": { "backend": "mongo" } },
//!   "schema": {
//!     "name": "Order",
//!     "version": { "value": "1.0.0", "changelog": "initial" },
//!     "access": { "find": ["anyone"], "insert": ["clerk"] },
//!     "fields": {
//!       "id": { "type": "uid", "constraints": { "required": true } },
//!       "address": { "type": "object", "fields": { "city": { "type": "string" } } },
//!       "lines": { "type": "array", "items": { "type": "object", "fields": { "sku": { "type": "string" } } } }
//!     }
//!   }
//! }
//! ```

use crate::error::{MetadataError, MetadataResult};
use docmeta_model::{
    Access, EntityInfo, EntityMetadata, EntitySchema, FieldConstraint, FieldTree, NodeId, TypeRef,
    TypeRegistry, Version,
};
use docmeta_types::Path;
use serde_json::{Map, Value};
use tracing::debug;

/// Parses one metadata document.
pub fn parse_metadata(doc: &Value, types: &TypeRegistry) -> MetadataResult<EntityMetadata> {
    let doc = as_object(doc, "metadata document")?;
    let info_node = doc
        .get("entityInfo")
        .ok_or_else(|| malformed("missing 'entityInfo'"))?;
    let mut info: EntityInfo = serde_json::from_value(info_node.clone())?;

    let schema_node = doc
        .get("schema")
        .ok_or_else(|| malformed("missing 'schema'"))
        .and_then(|s| as_object(s, "schema"))?;
    let name = schema_node
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(&info.name)
        .to_string();
    let version = parse_version(schema_node.get("version"))?;
    let access = match schema_node.get("access") {
        Some(node) => parse_access(node)?,
        None => Access::new(),
    };
    let fields = parse_fields(schema_node.get("fields"), types)?;

    info.versions.insert(version.value.clone());
    debug!("Parsed metadata for {}:{}", info.name, version.value);
    Ok(EntityMetadata::new(
        info,
        EntitySchema::new(name, version, fields).with_access(access),
    ))
}

/// Parses either a single metadata document or an array of them.
pub fn parse_metadata_list(doc: &Value, types: &TypeRegistry) -> MetadataResult<Vec<EntityMetadata>> {
    match doc {
        Value::Array(items) => items.iter().map(|d| parse_metadata(d, types)).collect(),
        single => Ok(vec![parse_metadata(single, types)?]),
    }
}

fn parse_version(node: Option<&Value>) -> MetadataResult<Version> {
    match node {
        Some(Value::String(value)) => Ok(Version::new(value.as_str())),
        Some(node @ Value::Object(_)) => Ok(serde_json::from_value(node.clone())?),
        Some(other) => Err(malformed(format!("schema.version must be an object, got {other}"))),
        None => Err(malformed("missing 'schema.version'")),
    }
}

fn parse_access(node: &Value) -> MetadataResult<Access> {
    Ok(serde_json::from_value(node.clone())?)
}

fn parse_fields(node: Option<&Value>, types: &TypeRegistry) -> MetadataResult<FieldTree> {
    let mut tree = FieldTree::new();
    let Some(node) = node else {
        return Ok(tree);
    };

    let mut pending: Vec<(NodeId, &Map<String, Value>)> = vec![(tree.root(), as_object(node, "fields")?)];
    while let Some((parent, fields)) = pending.pop() {
        for (name, decl) in fields {
            let path = tree.full_path(parent).child(name.as_str());
            let decl = as_object(decl, &path.to_string())?;
            let type_name = type_of(decl, &path)?;

            let id = match type_name {
                "object" => {
                    let id = tree.add_object(parent, name)?;
                    pending.push((id, nested_fields(decl, &path)?));
                    id
                }
                "array" => {
                    let items = decl
                        .get("items")
                        .ok_or_else(|| malformed(format!("array field '{path}' has no 'items'")))
                        .and_then(|i| as_object(i, &path.to_string()))?;
                    let item_path = path.child(docmeta_types::ANY);
                    match type_of(items, &item_path)? {
                        "object" => {
                            let (array, element) = tree.add_object_array(parent, name)?;
                            pending.push((element, nested_fields(items, &item_path)?));
                            array
                        }
                        scalar => tree.add_array(parent, name, lookup_scalar(types, scalar, &item_path)?)?,
                    }
                }
                scalar => tree.add_simple(parent, name, lookup_scalar(types, scalar, &path)?)?,
            };

            if let Some(constraints) = decl.get("constraints") {
                for constraint in parse_constraints(constraints, &path)? {
                    tree.add_constraint(id, constraint)?;
                }
            }
            if let Some(access) = decl.get("access") {
                for (operation, roles) in parse_access(access)? {
                    tree.add_access(id, operation, roles);
                }
            }
        }
    }
    Ok(tree)
}

fn parse_constraints(node: &Value, path: &Path) -> MetadataResult<Vec<FieldConstraint>> {
    let mut out = Vec::new();
    for (key, value) in as_object(node, &format!("{path}.constraints"))? {
        let bad = || malformed(format!("constraint '{key}' on '{path}' has invalid value {value}"));
        let constraint = match key.as_str() {
            "required" => match value.as_bool().ok_or_else(bad)? {
                true => FieldConstraint::Required,
                false => continue,
            },
            "minLength" => FieldConstraint::MinLength(as_usize(value).ok_or_else(bad)?),
            "maxLength" => FieldConstraint::MaxLength(as_usize(value).ok_or_else(bad)?),
            "minimum" => FieldConstraint::Minimum(value.as_f64().ok_or_else(bad)?),
            "maximum" => FieldConstraint::Maximum(value.as_f64().ok_or_else(bad)?),
            "matches" => FieldConstraint::Matches(value.as_str().ok_or_else(bad)?.to_string()),
            "enum" => FieldConstraint::Enum(value.as_str().ok_or_else(bad)?.to_string()),
            other => return Err(malformed(format!("unknown constraint '{other}' on '{path}'"))),
        };
        out.push(constraint);
    }
    Ok(out)
}

fn as_usize(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn type_of<'a>(decl: &'a Map<String, Value>, path: &Path) -> MetadataResult<&'a str> {
    decl.get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("field '{path}' has no 'type'")))
}

fn nested_fields<'a>(decl: &'a Map<String, Value>, path: &Path) -> MetadataResult<&'a Map<String, Value>> {
    decl.get("fields")
        .ok_or_else(|| malformed(format!("object field '{path}' has no 'fields'")))
        .and_then(|f| as_object(f, &path.to_string()))
}

/// Leaves and array items must name a scalar type.
fn lookup_scalar(types: &TypeRegistry, type_name: &str, path: &Path) -> MetadataResult<TypeRef> {
    let ty = types.get(type_name).ok_or_else(|| MetadataError::UnknownType {
        field: path.to_string(),
        type_name: type_name.to_string(),
    })?;
    if ty.is_container() {
        return Err(malformed(format!(
            "'{path}' uses container type '{type_name}' where a scalar is expected"
        )));
    }
    Ok(ty)
}

fn as_object<'a>(value: &'a Value, what: &str) -> MetadataResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("{what} must be an object")))
}

fn malformed(detail: impl Into<String>) -> MetadataError {
    MetadataError::Malformed(detail.into())
}
