//! Schema model for docmeta.
//!
//! Defines the data every other docmeta layer reads:
//! - [`Type`] / [`TypeRegistry`]: canonical scalar and container types
//! - [`FieldTree`]: arena of composite, leaf and array nodes describing an entity's shape
//! - [`EntitySchema`] / [`EntityInfo`]: one version of an entity plus its version-independent facts
//! - [`RoleMap`]: role → operation → field paths, consumed by access control
//!
//! Published schemas are immutable values; the registry in `docmeta-metadata`
//! shares them behind `Arc`.

mod entity;
mod error;
mod field;
mod roles;
mod types;

pub use entity::{DataStore, EntityInfo, EntityMetadata, EntitySchema, SchemaStatus, Version};
pub use error::{FieldTreeError, FieldTreeResult, ModelError, TypeError, TypeResult};
pub use field::{Children, FieldConstraint, FieldNode, FieldTree, NodeId, NodeKind, SimpleField};
pub use roles::{Access, Operation, RoleMap};
pub use types::{
    ContainerKind, ContainerType, DATE_FORMAT, ScalarType, ScalarValue, Type, TypeRef, TypeRegistry,
};
