//! Applies a projector tree to a JSON document.

use crate::error::{ProjectionError, ProjectionResult};
use crate::projector::{Decision, EvaluationContext, Projector};
use docmeta_model::FieldTree;
use docmeta_types::Path;
use serde_json::{Map, Value};

/// A projector together with the default it applies to undecided leaves.
#[derive(Clone, Copy)]
struct Scope<'p> {
    projector: &'p dyn Projector,
    include_unmentioned: bool,
}

impl<'p> Scope<'p> {
    fn of(projector: &'p dyn Projector) -> Self {
        Self {
            projector,
            include_unmentioned: !projector.has_inclusion(),
        }
    }
}

struct Walker<'a> {
    tree: &'a FieldTree,
    ctx: EvaluationContext<'a>,
}

/// Returns the fields of `document` selected by `projector`.
///
/// Fields unknown to `tree` are dropped. Included objects and arrays are
/// walked with the projector the decision supplied, or the current one.
/// Undecided leaves follow the scope's default policy; undecided
/// composites are kept only if something beneath them survives.
pub fn project_document(
    projector: &dyn Projector,
    tree: &FieldTree,
    document: &Value,
) -> ProjectionResult<Value> {
    let Value::Object(fields) = document else {
        return Err(ProjectionError::Malformed(
            "document must be a JSON object".to_string(),
        ));
    };
    let walker = Walker {
        tree,
        ctx: EvaluationContext::new(document),
    };
    Ok(Value::Object(walker.object(Scope::of(projector), &Path::empty(), fields)))
}

impl Walker<'_> {
    fn object(&self, scope: Scope<'_>, base: &Path, fields: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, value) in fields {
            let path = base.child(name.as_str());
            if self.tree.resolve(&path).is_none() {
                continue;
            }
            if let Some(projected) = self.value(scope, &path, value) {
                out.insert(name.clone(), projected);
            }
        }
        out
    }

    fn array(&self, scope: Scope<'_>, base: &Path, items: &[Value]) -> Vec<Value> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.value(scope, &base.child(i.to_string()), item))
            .collect()
    }

    fn value(&self, scope: Scope<'_>, path: &Path, value: &Value) -> Option<Value> {
        let projected = scope.projector.project(path, &self.ctx);
        let next = projected.nested.map_or(scope, Scope::of);

        match (projected.decision, value) {
            (Decision::Exclude, _) => None,
            (Decision::Include, Value::Object(fields)) => {
                Some(Value::Object(self.object(next, path, fields)))
            }
            (Decision::Include, Value::Array(items)) => {
                Some(Value::Array(self.array(next, path, items)))
            }
            (Decision::Include, leaf) => Some(leaf.clone()),
            (Decision::Undecided, Value::Object(fields)) => {
                let kept = self.object(next, path, fields);
                let keep = !kept.is_empty() || (fields.is_empty() && next.include_unmentioned);
                keep.then_some(Value::Object(kept))
            }
            (Decision::Undecided, Value::Array(items)) => {
                let kept = self.array(next, path, items);
                let keep = !kept.is_empty() || (items.is_empty() && next.include_unmentioned);
                keep.then_some(Value::Array(kept))
            }
            (Decision::Undecided, leaf) => scope.include_unmentioned.then(|| leaf.clone()),
        }
    }
}
