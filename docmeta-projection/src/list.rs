use crate::error::ProjectionResult;
use crate::projection::Projection;
use crate::projector::{EvaluationContext, Projected, Projector, compile};
use docmeta_model::{FieldTree, NodeId};
use docmeta_types::Path;

/// An ordered list of rules where the last matching rule wins.
#[derive(Debug)]
pub struct ListProjector {
    items: Vec<Box<dyn Projector>>,
}

impl ListProjector {
    /// Compiles every item against the same context.
    pub fn new(
        projections: &[Projection],
        ctx_path: &Path,
        tree: &FieldTree,
        ctx: NodeId,
    ) -> ProjectionResult<Self> {
        let items = projections
            .iter()
            .map(|p| compile(p, ctx_path, tree, ctx))
            .collect::<ProjectionResult<Vec<_>>>()?;
        Ok(Self { items })
    }

    pub fn from_projectors(items: Vec<Box<dyn Projector>>) -> Self {
        Self { items }
    }

    /// Items in declaration order.
    pub fn items(&self) -> &[Box<dyn Projector>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Projector for ListProjector {
    fn project<'a>(&'a self, path: &Path, ctx: &EvaluationContext<'_>) -> Projected<'a> {
        for item in self.items.iter().rev() {
            let projected = item.project(path, ctx);
            if projected.decision.is_decided() {
                return projected;
            }
        }
        Projected::UNDECIDED
    }

    fn exact_match(&self) -> bool {
        self.items.iter().any(|item| item.exact_match())
    }

    fn has_inclusion(&self) -> bool {
        self.items.iter().any(|item| item.has_inclusion())
    }
}
