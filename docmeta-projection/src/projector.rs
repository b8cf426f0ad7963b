//! The projector contract and the compiler that builds projector trees.
//!
//! A projector answers, for one absolute document path, whether the field
//! is included, excluded, or not covered by any rule. Evaluation takes
//! `&self` and returns everything it found in a [`Projected`] record, so a
//! compiled tree can be shared across threads and documents.

use crate::array::ArrayRangeProjector;
use crate::error::{ProjectionError, ProjectionResult};
use crate::field::FieldProjector;
use crate::list::ListProjector;
use crate::projection::Projection;
use docmeta_model::{FieldTree, NodeId, NodeKind};
use docmeta_types::{ANY, Path};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Tri-state answer for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Include,
    Exclude,
    /// No rule covers the path; the caller applies its default policy.
    Undecided,
}

impl Decision {
    pub fn from_include(include: bool) -> Self {
        if include { Self::Include } else { Self::Exclude }
    }

    pub fn is_decided(self) -> bool {
        self != Self::Undecided
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Include => Some(true),
            Self::Exclude => Some(false),
            Self::Undecided => None,
        }
    }
}

/// Result of a single [`Projector::project`] call.
#[derive(Debug, Clone, Copy)]
pub struct Projected<'a> {
    pub decision: Decision,
    /// Projector for the children of the decided path, when it differs from the caller's.
    pub nested: Option<&'a dyn Projector>,
    /// The concrete rule that produced the decision.
    pub deciding: Option<&'a dyn Projector>,
}

impl<'a> Projected<'a> {
    pub const UNDECIDED: Projected<'static> = Projected {
        decision: Decision::Undecided,
        nested: None,
        deciding: None,
    };

    pub fn decided(decision: Decision, deciding: &'a dyn Projector) -> Self {
        Self {
            decision,
            nested: None,
            deciding: Some(deciding),
        }
    }

    #[must_use]
    pub fn with_nested(mut self, nested: Option<&'a dyn Projector>) -> Self {
        self.nested = nested;
        self
    }
}

static DETACHED: Value = Value::Null;

/// Per-document data available to projectors during evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'d> {
    document: &'d Value,
}

impl<'d> EvaluationContext<'d> {
    pub fn new(document: &'d Value) -> Self {
        Self { document }
    }

    /// A context not tied to any document.
    pub fn detached() -> EvaluationContext<'static> {
        EvaluationContext { document: &DETACHED }
    }

    pub fn document(&self) -> &'d Value {
        self.document
    }
}

/// A compiled projection rule, or a composite of rules.
pub trait Projector: fmt::Debug + Send + Sync {
    /// Decides `path` (absolute, with numeric array indexes). Never fails.
    fn project<'a>(&'a self, path: &Path, ctx: &EvaluationContext<'_>) -> Projected<'a>;

    /// True if this projector, or any projector it composes, has a rule
    /// naming a path exactly rather than by wildcard or subtree.
    fn exact_match(&self) -> bool;

    /// True if any rule includes something. A scope with an inclusion
    /// drops unmentioned fields; one made only of exclusions keeps them.
    fn has_inclusion(&self) -> bool;
}

/// Compiles `projection` against the field-tree node `ctx`, whose absolute
/// path is `ctx_path`. Every referenced field is checked here; evaluation
/// of the result cannot fail. A `ctx` that does not belong to `tree` is
/// reported as [`ProjectionError::UnknownContext`].
pub fn compile(
    projection: &Projection,
    ctx_path: &Path,
    tree: &FieldTree,
    ctx: NodeId,
) -> ProjectionResult<Box<dyn Projector>> {
    let projector: Box<dyn Projector> = match projection {
        Projection::Field(p) => Box::new(FieldProjector::new(p, ctx_path, tree, ctx)?),
        Projection::ArrayRange(p) => Box::new(ArrayRangeProjector::new(p, ctx_path, tree, ctx)?),
        Projection::List(items) => Box::new(ListProjector::new(items, ctx_path, tree, ctx)?),
    };
    debug!(context = %ctx_path, "Compiled projector {:?}", projector);
    Ok(projector)
}

/// Field-tree nodes under `ctx` matched by a relative pattern.
///
/// `*` matches every child of an object and the element of an array; a
/// numeric segment matches the element of an array.
pub(crate) fn resolve_pattern(
    tree: &FieldTree,
    ctx: NodeId,
    ctx_path: &Path,
    pattern: &Path,
) -> ProjectionResult<Vec<NodeId>> {
    if tree.get(ctx).is_none() {
        return Err(ProjectionError::UnknownContext(ctx_path.to_string()));
    }
    let mut current = vec![ctx];
    for segment in pattern.segments() {
        let mut next = Vec::new();
        for id in current {
            let Some(node) = tree.get(id) else { continue };
            match node.kind() {
                NodeKind::Object { .. } if segment == ANY => next.extend(tree.children(id)),
                NodeKind::Object { .. } => next.extend(tree.child(id, segment)),
                NodeKind::Array { element } if segment == ANY || segment.parse::<usize>().is_ok() => {
                    next.push(*element);
                }
                _ => {}
            }
        }
        current = next;
    }
    Ok(current)
}
