//! Declarative projection rules as received from a request.
//!
//! ```json
//! [
//!   { "field": "address", "recursive": true },
//!   { "field": "address.zip", "include": false },
//!   { "field": "lines", "range": [0, 4], "project": { "field": "sku" } }
//! ]
//! ```
//!
//! Paths are relative to the context the rule is compiled against. Inside
//! an array-range rule, `project` is relative to the array element.

use crate::error::ProjectionResult;
use docmeta_types::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn yes() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Includes or excludes one field, optionally with its whole subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldProjection {
    pub field: Path,
    #[serde(default = "yes")]
    pub include: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub recursive: bool,
}

/// Selects elements `from..=to` of an array field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArrayRangeProjection {
    pub field: Path,
    #[serde(default = "yes")]
    pub include: bool,
    pub range: (usize, usize),
    /// Applied to the selected elements; absent means whole elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<Projection>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Projection {
    List(Vec<Projection>),
    ArrayRange(ArrayRangeProjection),
    Field(FieldProjection),
}

impl Projection {
    pub fn include(field: Path) -> Self {
        Self::Field(FieldProjection {
            field,
            include: true,
            recursive: false,
        })
    }

    pub fn exclude(field: Path) -> Self {
        Self::Field(FieldProjection {
            field,
            include: false,
            recursive: false,
        })
    }

    /// Includes `field` and everything beneath it.
    pub fn include_subtree(field: Path) -> Self {
        Self::Field(FieldProjection {
            field,
            include: true,
            recursive: true,
        })
    }

    pub fn exclude_subtree(field: Path) -> Self {
        Self::Field(FieldProjection {
            field,
            include: false,
            recursive: true,
        })
    }

    pub fn range(field: Path, from: usize, to: usize, project: Option<Projection>) -> Self {
        Self::ArrayRange(ArrayRangeProjection {
            field,
            include: true,
            range: (from, to),
            project: project.map(Box::new),
        })
    }

    pub fn from_json(value: &Value) -> ProjectionResult<Self> {
        Ok(Self::deserialize(value)?)
    }
}
