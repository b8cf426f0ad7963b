//! Best-effort JSON-Schema view of an entity version, for documentation
//! tooling. Not consumed by projection.
//!
//! The field tree is walked with an explicit stack of sibling iterators so
//! that very deep schemas do not grow the native call stack.

use docmeta_model::{Children, EntitySchema, FieldConstraint, FieldTree, NodeKind, SimpleField};
use serde_json::{Map, Value, json};

/// `$schema` URI emitted when none is configured.
pub const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

/// Where a finished object's properties are attached.
enum Slot {
    Root,
    Field(String),
    Items(String),
}

struct Frame<'t> {
    children: Children<'t>,
    properties: Map<String, Value>,
    slot: Slot,
}

/// Derives the JSON-Schema document for `schema`.
pub fn derive(schema: &EntitySchema, dialect: &str) -> Value {
    let properties = build_properties(schema.fields());
    let required: Vec<Value> = schema
        .required_fields()
        .iter()
        .map(|path| Value::String(path.to_string()))
        .collect();

    json!({
        "$schema": dialect,
        "type": "object",
        "description": format!(
            "JSON schema for entity '{}' version '{}'",
            schema.name(),
            schema.version().value
        ),
        "properties": properties,
        "required": required,
    })
}

fn build_properties(tree: &FieldTree) -> Map<String, Value> {
    let mut stack = vec![Frame {
        children: tree.children(tree.root()),
        properties: Map::new(),
        slot: Slot::Root,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(id) = frame.children.next() else {
            let Some(done) = stack.pop() else { break };
            let Some(parent) = stack.last_mut() else {
                return done.properties;
            };
            let object = object_schema(done.properties);
            match done.slot {
                Slot::Field(name) => {
                    parent.properties.insert(name, object);
                }
                Slot::Items(name) => {
                    parent.properties.insert(name, json!({"type": "array", "items": object}));
                }
                Slot::Root => {}
            }
            continue;
        };

        let node = tree.node(id);
        let name = node.name().to_string();
        match node.kind() {
            NodeKind::Simple(simple) => {
                frame.properties.insert(name, leaf_schema(simple));
            }
            NodeKind::Object { .. } => stack.push(Frame {
                children: tree.children(id),
                properties: Map::new(),
                slot: Slot::Field(name),
            }),
            NodeKind::Array { element } => match tree.node(*element).kind() {
                NodeKind::Simple(simple) => {
                    frame
                        .properties
                        .insert(name, json!({"type": "array", "items": leaf_schema(simple)}));
                }
                NodeKind::Object { .. } => stack.push(Frame {
                    children: tree.children(*element),
                    properties: Map::new(),
                    slot: Slot::Items(name),
                }),
                NodeKind::Array { .. } => {
                    frame.properties.insert(name, json!({"type": "array"}));
                }
            },
        }
    }
    Map::new()
}

fn object_schema(properties: Map<String, Value>) -> Value {
    json!({"type": "object", "properties": properties})
}

fn leaf_schema(field: &SimpleField) -> Value {
    let mut out = Map::new();
    out.insert("type".into(), Value::String(field.ty.name().to_string()));
    for constraint in &field.constraints {
        match constraint {
            FieldConstraint::MinLength(n) => {
                out.insert("minLength".into(), json!(n));
            }
            FieldConstraint::MaxLength(n) => {
                out.insert("maxLength".into(), json!(n));
            }
            FieldConstraint::Minimum(n) => {
                out.insert("minimum".into(), json!(n));
            }
            FieldConstraint::Maximum(n) => {
                out.insert("maximum".into(), json!(n));
            }
            FieldConstraint::Matches(pattern) => {
                out.insert("pattern".into(), json!(pattern));
            }
            // Listed at the top level / not expressible.
            FieldConstraint::Required | FieldConstraint::Enum(_) => {}
        }
    }
    Value::Object(out)
}
