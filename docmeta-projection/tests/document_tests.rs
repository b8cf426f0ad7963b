use docmeta_model::{FieldTree, TypeRegistry};
use docmeta_projection::{Projection, ProjectionError, compile, project_document};
use docmeta_types::Path;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn tree() -> FieldTree {
    let types = TypeRegistry::with_defaults();
    let string = types.get("string").unwrap();
    let mut tree = FieldTree::new();
    tree.add_simple(tree.root(), "id", types.get("uid").unwrap()).unwrap();
    tree.add_simple(tree.root(), "name", string.clone()).unwrap();
    let address = tree.add_object(tree.root(), "address").unwrap();
    tree.add_simple(address, "city", string.clone()).unwrap();
    tree.add_simple(address, "zip", string.clone()).unwrap();
    tree.add_array(tree.root(), "tags", string.clone()).unwrap();
    let (_, line) = tree.add_object_array(tree.root(), "lines").unwrap();
    tree.add_simple(line, "sku", string).unwrap();
    tree.add_simple(line, "qty", types.get("integer").unwrap()).unwrap();
    tree
}

fn document() -> Value {
    json!({
        "id": "o-1",
        "name": "first order",
        "address": {"city": "Oslo", "zip": "0150"},
        "tags": ["rush", "gift"],
        "lines": [
            {"sku": "A", "qty": 1},
            {"sku": "B", "qty": 2},
            {"sku": "C", "qty": 3}
        ],
        "internal": "not in the schema"
    })
}

fn run(projection: Value) -> Value {
    let tree = tree();
    let projection = Projection::from_json(&projection).unwrap();
    let projector = compile(&projection, &Path::empty(), &tree, tree.root()).unwrap();
    project_document(&*projector, &tree, &document()).unwrap()
}

#[test]
fn inclusions_select_only_named_fields() {
    assert_eq!(
        run(json!([{"field": "id"}, {"field": "address.city"}])),
        json!({"id": "o-1", "address": {"city": "Oslo"}})
    );
}

#[test]
fn exclusions_keep_everything_else() {
    assert_eq!(
        run(json!([{"field": "address.zip", "include": false}, {"field": "lines", "include": false}])),
        json!({
            "id": "o-1",
            "name": "first order",
            "address": {"city": "Oslo"},
            "tags": ["rush", "gift"]
        })
    );
}

#[test]
fn subtree_exclusion_keeps_everything_else() {
    assert_eq!(
        run(json!({"field": "address", "recursive": true, "include": false})),
        json!({
            "id": "o-1",
            "name": "first order",
            "tags": ["rush", "gift"],
            "lines": [
                {"sku": "A", "qty": 1},
                {"sku": "B", "qty": 2},
                {"sku": "C", "qty": 3}
            ]
        })
    );
}

#[test]
fn last_rule_wins_on_documents() {
    assert_eq!(
        run(json!([{"field": "name"}, {"field": "name", "include": false}, {"field": "id"}])),
        json!({"id": "o-1"})
    );
}

#[test]
fn recursive_inclusion_with_exception() {
    assert_eq!(
        run(json!([{"field": "address", "recursive": true}, {"field": "address.zip", "include": false}])),
        json!({"address": {"city": "Oslo"}})
    );
}

#[test]
fn scalar_array_inclusion() {
    assert_eq!(run(json!({"field": "tags"})), json!({"tags": ["rush", "gift"]}));
}

#[test]
fn wildcard_inclusion_over_array_elements() {
    assert_eq!(
        run(json!({"field": "lines.*.sku"})),
        json!({"lines": [{"sku": "A"}, {"sku": "B"}, {"sku": "C"}]})
    );
}

#[test]
fn array_range_with_nested_projection() {
    assert_eq!(
        run(json!([{"field": "id"}, {"field": "lines", "range": [1, 2], "project": {"field": "qty"}}])),
        json!({"id": "o-1", "lines": [{"qty": 2}, {"qty": 3}]})
    );
}

#[test]
fn nested_exclusion_uses_its_own_default() {
    assert_eq!(
        run(json!({"field": "lines", "range": [0, 0], "project": {"field": "sku", "include": false}})),
        json!({"lines": [{"qty": 1}]})
    );
}

#[test]
fn array_range_without_projection() {
    assert_eq!(
        run(json!({"field": "lines", "range": [2, 5]})),
        json!({"lines": [{"sku": "C", "qty": 3}]})
    );
}

#[test]
fn empty_projection_returns_known_fields() {
    let mut expected = document();
    expected.as_object_mut().unwrap().remove("internal");
    assert_eq!(run(json!([])), expected);
}

#[test]
fn non_object_document_is_rejected() {
    let tree = tree();
    let projector = compile(&Projection::List(vec![]), &Path::empty(), &tree, tree.root()).unwrap();
    assert!(matches!(
        project_document(&*projector, &tree, &json!([1, 2])),
        Err(ProjectionError::Malformed(_))
    ));
}
