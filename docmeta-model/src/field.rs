//! Field tree: the shape of an entity.
//!
//! Nodes live in an arena owned by [`FieldTree`]. Each node records its
//! parent as a [`NodeId`] (a non-owning back-reference), and composite nodes
//! list their children in declaration order. No method here walks deeper
//! than one level at a time except path resolution, which is iterative.

use crate::error::{FieldTreeError, FieldTreeResult};
use crate::roles::{Access, Operation};
use crate::types::TypeRef;
use docmeta_types::{ANY, Path};
use serde::{Deserialize, Serialize};

/// Index of a node inside its [`FieldTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root object of every tree.
    pub const ROOT: NodeId = NodeId(0);

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Field-level constraint. Evaluated by a separate validation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldConstraint {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Minimum(f64),
    Maximum(f64),
    /// Regular expression source the value must match.
    Matches(String),
    /// Name of an enumeration declared alongside the schema.
    Enum(String),
}

/// A leaf bound to exactly one type.
#[derive(Debug, Clone)]
pub struct SimpleField {
    pub ty: TypeRef,
    pub constraints: Vec<FieldConstraint>,
}

/// The node variants.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Named children in declaration order.
    Object { children: Vec<NodeId> },
    Simple(SimpleField),
    /// Ordered collection; the single element node is named [`ANY`].
    Array { element: NodeId },
}

#[derive(Debug, Clone)]
pub struct FieldNode {
    name: String,
    parent: Option<NodeId>,
    kind: NodeKind,
    access: Access,
}

impl FieldNode {
    /// Name within the parent. The root's name is empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, NodeKind::Object { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, NodeKind::Array { .. })
    }

    pub fn as_simple(&self) -> Option<&SimpleField> {
        match &self.kind {
            NodeKind::Simple(simple) => Some(simple),
            _ => None,
        }
    }

    /// The bound type of a leaf.
    pub fn ty(&self) -> Option<&TypeRef> {
        self.as_simple().map(|s| &s.ty)
    }

    pub fn constraints(&self) -> &[FieldConstraint] {
        self.as_simple().map_or(&[], |s| s.constraints.as_slice())
    }

    pub fn is_required(&self) -> bool {
        self.constraints().contains(&FieldConstraint::Required)
    }

    /// Roles allowed per operation on this field.
    pub fn access(&self) -> &Access {
        &self.access
    }
}

/// Restartable iterator over a node's direct children.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    ids: std::slice::Iter<'a, NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Arena-backed field tree with an object at its root.
#[derive(Debug, Clone)]
pub struct FieldTree {
    nodes: Vec<FieldNode>,
}

impl Default for FieldTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![FieldNode {
                name: String::new(),
                parent: None,
                kind: NodeKind::Object {
                    children: Vec::new(),
                },
                access: Access::new(),
            }],
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns the node for `id`.
    ///
    /// Panics if `id` was minted by a different tree.
    pub fn node(&self, id: NodeId) -> &FieldNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&FieldNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.num_children(NodeId::ROOT) == 0
    }

    /// Every node except the root, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        (1..self.nodes.len()).map(NodeId)
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        let ids: &[NodeId] = match &self.node(id).kind {
            NodeKind::Object { children } => children,
            NodeKind::Array { element } => std::slice::from_ref(element),
            NodeKind::Simple(_) => &[],
        };
        Children { ids: ids.iter() }
    }

    pub fn num_children(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Direct child of `id` named `name`.
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id).find(|c| self.node(*c).name == name)
    }

    /// The array element node, if `id` is an array.
    pub fn element(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).kind {
            NodeKind::Array { element } => Some(element),
            _ => None,
        }
    }

    /// Full path from the root; array elements contribute [`ANY`].
    pub fn full_path(&self, id: NodeId) -> Path {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            if node.parent.is_some() {
                segments.push(node.name.clone());
            }
            cursor = node.parent;
        }
        segments.reverse();
        // Names are validated non-empty on insertion.
        Path::from_segments(segments).unwrap_or_default()
    }

    /// Resolves a path relative to the root.
    pub fn resolve(&self, path: &Path) -> Option<NodeId> {
        self.resolve_from(NodeId::ROOT, path)
    }

    /// Resolves a path relative to `from`.
    ///
    /// Under an array, numeric indexes and [`ANY`] select the element.
    pub fn resolve_from(&self, from: NodeId, path: &Path) -> Option<NodeId> {
        let mut current = from;
        for (i, segment) in path.segments().iter().enumerate() {
            current = match &self.node(current).kind {
                NodeKind::Object { .. } if segment != ANY => self.child(current, segment)?,
                NodeKind::Array { element } if segment == ANY || path.is_index(i) => *element,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn add_simple(&mut self, parent: NodeId, name: &str, ty: TypeRef) -> FieldTreeResult<NodeId> {
        self.attach(parent, name, simple(ty))
    }

    pub fn add_object(&mut self, parent: NodeId, name: &str) -> FieldTreeResult<NodeId> {
        self.attach(parent, name, empty_object())
    }

    /// Adds an array of scalars. Returns the array node.
    pub fn add_array(&mut self, parent: NodeId, name: &str, element_ty: TypeRef) -> FieldTreeResult<NodeId> {
        let array = self.attach(parent, name, NodeKind::Array { element: NodeId(0) })?;
        self.attach_element(array, simple(element_ty));
        Ok(array)
    }

    /// Adds an array of objects. Returns `(array, element)`.
    pub fn add_object_array(&mut self, parent: NodeId, name: &str) -> FieldTreeResult<(NodeId, NodeId)> {
        let array = self.attach(parent, name, NodeKind::Array { element: NodeId(0) })?;
        let element = self.attach_element(array, empty_object());
        Ok((array, element))
    }

    pub fn add_constraint(&mut self, id: NodeId, constraint: FieldConstraint) -> FieldTreeResult<()> {
        let path = self.full_path(id);
        match &mut self.nodes[id.0].kind {
            NodeKind::Simple(simple) => {
                simple.constraints.push(constraint);
                Ok(())
            }
            _ => Err(FieldTreeError::NotSimple(path.to_string())),
        }
    }

    /// Appends roles allowed to perform `operation` on the field.
    pub fn add_access<I, S>(&mut self, id: NodeId, operation: Operation, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes[id.0]
            .access
            .entry(operation)
            .or_default()
            .extend(roles.into_iter().map(Into::into));
    }

    fn attach(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> FieldTreeResult<NodeId> {
        let parent_path = self.full_path(parent);
        if name.is_empty() {
            return Err(FieldTreeError::EmptyName(parent_path.to_string()));
        }
        if name.contains('.') || name == ANY {
            return Err(FieldTreeError::InvalidName(name.to_string()));
        }
        if !self.node(parent).is_object() {
            return Err(FieldTreeError::NotComposite(parent_path.to_string()));
        }
        if self.child(parent, name).is_some() {
            return Err(FieldTreeError::DuplicateField(parent_path.child(name).to_string()));
        }

        let id = self.push(parent, name, kind);
        if let NodeKind::Object { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        Ok(id)
    }

    fn attach_element(&mut self, array: NodeId, kind: NodeKind) -> NodeId {
        let element = self.push(array, ANY, kind);
        self.nodes[array.0].kind = NodeKind::Array { element };
        element
    }

    fn push(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FieldNode {
            name: name.to_string(),
            parent: Some(parent),
            kind,
            access: Access::new(),
        });
        id
    }
}

fn simple(ty: TypeRef) -> NodeKind {
    NodeKind::Simple(SimpleField {
        ty,
        constraints: Vec::new(),
    })
}

fn empty_object() -> NodeKind {
    NodeKind::Object {
        children: Vec::new(),
    }
}
