//! Node types stored in the tree arena.

use std::fmt;

use generational_arena::Index;
use serde_json::{Map, Value};

/// Separator used for ids and index paths when nothing else is configured.
pub const DEFAULT_SEPARATOR: char = '/';

/// Id given to a node created without a parent.
pub const ROOT_ID: &str = "0";

/// Arbitrary key/value payload carried by every node.
pub type NodeData = Map<String, Value>;

/// Stable handle of a node inside its [`Tree`](crate::domain::Tree).
///
/// Unlike the user-facing string id, a handle never changes and is never
/// reused once the node has been discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl NodeId {
    pub(crate) const fn new(index: Index) -> Self {
        Self(index)
    }

    pub(crate) const fn index(self) -> Index {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "NodeId({slot}v{generation})")
    }
}

/// Optional construction parameters of a node.
///
/// Anything left unset is derived from the parent: the separator is
/// inherited and the id is computed by [`node_id`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOptions {
    pub data: Option<NodeData>,
    pub id: Option<String>,
    pub separator: Option<char>,
}

impl NodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn data(mut self, data: NodeData) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }
}

/// Tree node in the arena-based hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub(crate) handle: NodeId,
    pub(crate) id: String,
    pub(crate) depth: usize,
    pub(crate) separator: char,
    pub(crate) data: NodeData,
    /// Non-owning link, None for roots and detached nodes
    pub(crate) parent: Option<NodeId>,
    /// Owned children in insertion order
    pub(crate) children: Vec<NodeId>,
}

impl TreeNode {
    /// Arena handle of this node.
    pub fn handle(&self) -> NodeId {
        self.handle
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replaces the id. Ids of existing descendants are left as they are.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Distance to the root the node was created under.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Derives the id of a node about to be appended under `parent`.
///
/// A parentless node gets [`ROOT_ID`]; otherwise the id is the parent's id
/// joined with the index the new child will occupy.
pub fn node_id(parent: Option<&TreeNode>, separator: char) -> String {
    match parent {
        Some(parent) => format!("{}{}{}", parent.id, separator, parent.children.len()),
        None => ROOT_ID.to_string(),
    }
}
