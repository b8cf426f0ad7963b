use crate::error::{ProjectionError, ProjectionResult};
use crate::projection::ArrayRangeProjection;
use crate::projector::{Decision, EvaluationContext, Projected, Projector, compile, resolve_pattern};
use docmeta_model::{FieldTree, NodeId, NodeKind};
use docmeta_types::{ANY, Path};

/// Selects elements `from..=to` of one array field.
///
/// Selected elements are projected with the nested projector when one was
/// given, otherwise they are returned whole. Elements outside the range are
/// left undecided.
#[derive(Debug)]
pub struct ArrayRangeProjector {
    field: Path,
    include: bool,
    from: usize,
    to: usize,
    nested: Option<Box<dyn Projector>>,
}

impl ArrayRangeProjector {
    pub fn new(
        projection: &ArrayRangeProjection,
        ctx_path: &Path,
        tree: &FieldTree,
        ctx: NodeId,
    ) -> ProjectionResult<Self> {
        let absolute = ctx_path.join(&projection.field);
        if projection.field.is_empty() {
            return Err(ProjectionError::InvalidPath(absolute.to_string()));
        }
        let element = match resolve_pattern(tree, ctx, ctx_path, &projection.field)?.as_slice() {
            [] => return Err(ProjectionError::UnknownField(absolute.to_string())),
            [id] => match tree.node(*id).kind() {
                NodeKind::Array { element } => *element,
                _ => return Err(ProjectionError::ExpectedArrayField(absolute.to_string())),
            },
            _ => {
                return Err(ProjectionError::InvalidPath(format!(
                    "{absolute} matches more than one field"
                )));
            }
        };

        let (from, to) = projection.range;
        if from > to {
            return Err(ProjectionError::InvalidRange {
                field: absolute.to_string(),
                from,
                to,
            });
        }

        let nested = match &projection.project {
            Some(p) => Some(compile(p, &absolute.child(ANY), tree, element)?),
            None => None,
        };

        Ok(Self {
            field: absolute,
            include: projection.include,
            from,
            to,
            nested,
        })
    }

    pub fn field(&self) -> &Path {
        &self.field
    }

    pub fn range(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    pub fn nested(&self) -> Option<&dyn Projector> {
        self.nested.as_deref()
    }
}

impl Projector for ArrayRangeProjector {
    fn project<'a>(&'a self, path: &Path, _ctx: &EvaluationContext<'_>) -> Projected<'a> {
        if path.matching_prefix(&self.field) {
            // An excluded range says nothing about the array itself.
            return if self.include {
                Projected::decided(Decision::Include, self)
            } else {
                Projected::UNDECIDED
            };
        }
        if !path.matching_descendant(&self.field) {
            return Projected::UNDECIDED;
        }
        let Some(index) = path.index_at(self.field.len()) else {
            return Projected::UNDECIDED;
        };
        if !(self.from..=self.to).contains(&index) {
            return Projected::UNDECIDED;
        }

        let decision = Decision::from_include(self.include);
        if path.len() == self.field.len() + 1 {
            let nested = if self.include { self.nested.as_deref() } else { None };
            return Projected::decided(decision, self).with_nested(nested);
        }
        match self.nested {
            None => Projected::decided(decision, self),
            Some(_) => Projected::UNDECIDED,
        }
    }

    fn exact_match(&self) -> bool {
        !self.field.has_wildcards()
    }

    fn has_inclusion(&self) -> bool {
        self.include
    }
}
