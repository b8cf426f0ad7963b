//! Field projection for docmeta.
//!
//! A [`Projection`] received with a request is compiled once, against an
//! entity's field tree, into a tree of [`Projector`]s:
//! - [`FieldProjector`]: include or exclude one field pattern, optionally its subtree
//! - [`ArrayRangeProjector`]: select a range of array elements, with a nested projection
//! - [`ListProjector`]: ordered rules, the last matching rule wins
//!
//! Compilation checks every path against the field tree. Evaluation never
//! fails and keeps no state between calls.

mod array;
mod document;
mod error;
mod field;
mod list;
mod projection;
mod projector;

pub use array::ArrayRangeProjector;
pub use document::project_document;
pub use error::{ProjectionError, ProjectionResult};
pub use field::FieldProjector;
pub use list::ListProjector;
pub use projection::{ArrayRangeProjection, FieldProjection, Projection};
pub use projector::{Decision, EvaluationContext, Projected, Projector, compile};
