use crate::error::{ProjectionError, ProjectionResult};
use crate::projection::FieldProjection;
use crate::projector::{Decision, EvaluationContext, Projected, Projector, resolve_pattern};
use docmeta_model::{FieldTree, NodeId, NodeKind};
use docmeta_types::Path;

/// Includes or excludes a single field pattern.
///
/// An inclusion also decides every ancestor of the field, since a parent
/// has to be emitted for the field to appear. An exclusion decides only
/// the field itself. Recursive rules additionally decide every descendant.
#[derive(Debug)]
pub struct FieldProjector {
    field: Path,
    include: bool,
    recursive: bool,
}

impl FieldProjector {
    pub fn new(
        projection: &FieldProjection,
        ctx_path: &Path,
        tree: &FieldTree,
        ctx: NodeId,
    ) -> ProjectionResult<Self> {
        let absolute = ctx_path.join(&projection.field);
        if projection.field.is_empty() {
            return Err(ProjectionError::InvalidPath(absolute.to_string()));
        }
        let matched = resolve_pattern(tree, ctx, ctx_path, &projection.field)?;
        if matched.is_empty() {
            return Err(ProjectionError::UnknownField(absolute.to_string()));
        }

        // Arrays of scalars are projected as whole values.
        let scalar_array = matched.iter().all(|&id| match tree.node(id).kind() {
            NodeKind::Array { element } => tree.node(*element).as_simple().is_some(),
            _ => false,
        });

        Ok(Self {
            field: absolute,
            include: projection.include,
            recursive: projection.recursive || scalar_array,
        })
    }

    /// Absolute field pattern.
    pub fn field(&self) -> &Path {
        &self.field
    }

    pub fn is_include(&self) -> bool {
        self.include
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }
}

impl Projector for FieldProjector {
    fn project<'a>(&'a self, path: &Path, _ctx: &EvaluationContext<'_>) -> Projected<'a> {
        if path.matching_prefix(&self.field) {
            if self.include {
                return Projected::decided(Decision::Include, self);
            }
            if path.matches(&self.field) {
                return Projected::decided(Decision::Exclude, self);
            }
        } else if self.recursive && path.matching_descendant(&self.field) {
            return Projected::decided(Decision::from_include(self.include), self);
        }
        Projected::UNDECIDED
    }

    fn exact_match(&self) -> bool {
        !self.recursive && !self.field.has_wildcards()
    }

    fn has_inclusion(&self) -> bool {
        self.include
    }
}
