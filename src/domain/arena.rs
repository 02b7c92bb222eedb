use std::ops::Index;

use generational_arena::Arena;
use tracing::{debug, instrument, trace};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::{node_id, NodeData, NodeId, NodeOptions, TreeNode, DEFAULT_SEPARATOR};
use crate::domain::traverse::{self, ExclusiveCursor, SharedCursor, Walk};

/// Selects the child to detach in [`Tree::remove_child`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRef {
    /// Position in the parent's children
    Index(usize),
    /// Handle of a node expected among the parent's children
    Node(NodeId),
}

impl From<usize> for ChildRef {
    fn from(index: usize) -> Self {
        ChildRef::Index(index)
    }
}

impl From<NodeId> for ChildRef {
    fn from(id: NodeId) -> Self {
        ChildRef::Node(id)
    }
}

/// Arena-based ordered multi-way tree.
///
/// The arena owns every node; parents own their children through the
/// ordered `children` handles while the `parent` link is a plain handle.
/// Any node handle doubles as the handle of the subtree beneath it, so every
/// query and traversal takes the node to start from.
///
/// Lookups through a handle that is not (or no longer) in the arena are
/// lenient and behave like an empty subtree; mutations report
/// [`TreeError::NodeNotFound`].
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Arena<TreeNode>,
    root: NodeId,
    /// Separator for nodes created without parent or explicit separator
    separator: char,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree holding a single root with id `"0"` and no data.
    pub fn new() -> Self {
        Self::with_root(NodeOptions::default())
    }

    /// Creates a tree whose nodes default to `separator`.
    pub fn with_separator(separator: char) -> Self {
        Self::with_root(NodeOptions::new().separator(separator))
    }

    #[instrument(level = "trace")]
    pub fn with_root(options: NodeOptions) -> Self {
        let separator = options.separator.unwrap_or(DEFAULT_SEPARATOR);
        let id = match options.id {
            Some(id) if !id.is_empty() => id,
            _ => node_id(None, separator),
        };
        let data = options.data.unwrap_or_default();

        let mut arena = Arena::new();
        let index = arena.insert_with(|index| TreeNode {
            handle: NodeId::new(index),
            id,
            depth: 0,
            separator,
            data,
            parent: None,
            children: Vec::new(),
        });
        Self {
            arena,
            root: NodeId::new(index),
            separator,
        }
    }

    /// Handle of the node the tree was created with.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Default separator of this tree.
    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.arena.get_mut(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.index())
    }

    /// Number of nodes alive in the arena, detached subtrees included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    fn checked(&self, id: NodeId) -> TreeResult<&TreeNode> {
        self.arena.get(id.index()).ok_or(TreeError::NodeNotFound(id))
    }

    fn checked_mut(&mut self, id: NodeId) -> TreeResult<&mut TreeNode> {
        self.arena
            .get_mut(id.index())
            .ok_or(TreeError::NodeNotFound(id))
    }

    /// Mutable cursor on `id` for chained appends.
    pub fn node_mut(&mut self, id: NodeId) -> TreeResult<NodeMut<'_>> {
        self.checked(id)?;
        Ok(NodeMut { tree: self, id })
    }

    // ------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------

    /// Allocates a node that points at `parent` without being appended to it.
    ///
    /// Depth, separator and id are resolved against the parent as it is now:
    /// the derived id names the index the node would get if appended next.
    #[instrument(level = "trace", skip(self))]
    pub fn create_node(
        &mut self,
        parent: Option<NodeId>,
        options: NodeOptions,
    ) -> TreeResult<NodeId> {
        let parent_node = parent.map(|id| self.checked(id)).transpose()?;
        let separator = options
            .separator
            .or_else(|| parent_node.map(TreeNode::separator))
            .unwrap_or(self.separator);
        let id = match options.id {
            Some(id) if !id.is_empty() => id,
            _ => node_id(parent_node, separator),
        };
        let depth = parent_node.map_or(0, |node| node.depth + 1);
        let data = options.data.unwrap_or_default();

        let index = self.arena.insert_with(|index| TreeNode {
            handle: NodeId::new(index),
            id,
            depth,
            separator,
            data,
            parent,
            children: Vec::new(),
        });
        trace!("created node {}", self.arena[index].id);
        Ok(NodeId::new(index))
    }

    /// Creates a node under `parent`, appends it and returns the new child.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_child(&mut self, parent: NodeId, options: NodeOptions) -> TreeResult<NodeId> {
        let child = self.create_node(Some(parent), options)?;
        self.checked_mut(parent)?.children.push(child);
        Ok(child)
    }

    /// Appends a new child to `parent` and returns `parent`.
    pub fn append_child(
        &mut self,
        parent: NodeId,
        data: Option<NodeData>,
        id: Option<&str>,
    ) -> TreeResult<NodeId> {
        let options = NodeOptions {
            data,
            id: id.map(str::to_string),
            separator: None,
        };
        self.insert_child(parent, options)?;
        Ok(parent)
    }

    // ------------------------------------------------------------
    // Detachment
    // ------------------------------------------------------------

    /// Detaches a child of `parent`, returning its handle.
    ///
    /// The detached node keeps its id, depth and subtree and becomes a root.
    /// A node handle that is not among the children yields `Ok(None)`; an
    /// index past the end is an [`TreeError::InvalidArgument`].
    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(
        &mut self,
        parent: NodeId,
        child: impl Into<ChildRef> + std::fmt::Debug,
    ) -> TreeResult<Option<NodeId>> {
        let children = &mut self.checked_mut(parent)?.children;
        let removed = match child.into() {
            ChildRef::Index(index) if index < children.len() => Some(children.remove(index)),
            ChildRef::Index(index) => {
                return Err(TreeError::InvalidArgument(format!(
                    "child index {index} out of bounds for {} children",
                    children.len()
                )))
            }
            ChildRef::Node(node) => children
                .iter()
                .position(|&candidate| candidate == node)
                .map(|position| children.remove(position)),
        };

        match removed {
            Some(removed) => {
                if let Some(node) = self.get_mut(removed) {
                    node.parent = None;
                    debug!("detached node {}", node.id);
                }
            }
            None => debug!("node is not a child of {parent}, nothing removed"),
        }
        Ok(removed)
    }

    /// Interprets a textual child reference: a position, or the id of a node
    /// in the subtree of `scope`.
    ///
    /// A token that is neither is an [`TreeError::InvalidArgument`].
    pub fn child_ref(&self, scope: NodeId, token: &str) -> TreeResult<ChildRef> {
        if let Ok(index) = token.parse::<usize>() {
            return Ok(ChildRef::Index(index));
        }
        self.find_id(scope, token)
            .map(ChildRef::Node)
            .ok_or_else(|| {
                TreeError::InvalidArgument(format!("'{token}' is neither an index nor a node"))
            })
    }

    /// Detaches `id` from its parent.
    ///
    /// Fails with [`TreeError::NoParent`] on a root. Returns `Ok(None)` when
    /// the parent does not list the node, e.g. after [`Tree::create_node`].
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        let node = self.checked(id)?;
        let parent = node
            .parent
            .ok_or_else(|| TreeError::NoParent(node.id.clone()))?;
        self.remove_child(parent, ChildRef::Node(id))
    }

    /// Frees `id` and its whole subtree from the arena.
    ///
    /// Returns the number of nodes freed. The tree root cannot be discarded.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, id: NodeId) -> TreeResult<usize> {
        if id == self.root {
            return Err(TreeError::InvalidArgument(
                "the tree root cannot be discarded".to_string(),
            ));
        }
        let parent = self.checked(id)?.parent;
        if let Some(parent) = parent {
            if self.contains(parent) {
                self.remove_child(parent, ChildRef::Node(id))?;
            }
        }
        let doomed = self.to_vec(id);
        for handle in &doomed {
            self.arena.remove(handle.index());
        }
        debug!("discarded {} nodes", doomed.len());
        Ok(doomed.len())
    }

    // ------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------

    /// Pre-order walk from `start`; the visitor may edit ids and data.
    ///
    /// Returning [`Walk::Stop`] (or `false`) from the visitor ends the whole
    /// walk, not just the current subtree.
    pub fn traverse_down<F, R>(&mut self, start: NodeId, visit: F)
    where
        F: FnMut(&mut TreeNode) -> R,
        R: Into<Walk>,
    {
        self.traverse_down_with(start, visit, |_| {});
    }

    /// Like [`Tree::traverse_down`], calling `post` on every child once its
    /// subtree has been walked.
    pub fn traverse_down_with<F, R, P>(&mut self, start: NodeId, mut visit: F, post: P)
    where
        F: FnMut(&mut TreeNode) -> R,
        R: Into<Walk>,
        P: FnMut(&mut TreeNode),
    {
        let mut cursor = ExclusiveCursor {
            arena: &mut self.arena,
            visit: move |node: &mut TreeNode| -> Walk { visit(node).into() },
            post,
        };
        traverse::descend(&mut cursor, start);
    }

    /// Visits `start` and its children, then each ancestor and its children.
    pub fn traverse_up<F, R>(&mut self, start: NodeId, mut visit: F)
    where
        F: FnMut(&mut TreeNode) -> R,
        R: Into<Walk>,
    {
        let mut cursor = ExclusiveCursor {
            arena: &mut self.arena,
            visit: move |node: &mut TreeNode| -> Walk { visit(node).into() },
            post: |_: &mut TreeNode| {},
        };
        traverse::ascend(&mut cursor, start);
    }

    /// Visits `start` and then its ancestors up to the root.
    pub fn bubble_up<F, R>(&mut self, start: NodeId, mut visit: F)
    where
        F: FnMut(&mut TreeNode) -> R,
        R: Into<Walk>,
    {
        let mut cursor = ExclusiveCursor {
            arena: &mut self.arena,
            visit: move |node: &mut TreeNode| -> Walk { visit(node).into() },
            post: |_: &mut TreeNode| {},
        };
        traverse::bubble(&mut cursor, start);
    }

    /// Read-only counterpart of [`Tree::traverse_down`].
    pub fn walk_down<F, R>(&self, start: NodeId, visit: F)
    where
        F: FnMut(&TreeNode) -> R,
        R: Into<Walk>,
    {
        self.walk_down_with(start, visit, |_| {});
    }

    /// Read-only counterpart of [`Tree::traverse_down_with`].
    pub fn walk_down_with<F, R, P>(&self, start: NodeId, mut visit: F, post: P)
    where
        F: FnMut(&TreeNode) -> R,
        R: Into<Walk>,
        P: FnMut(&TreeNode),
    {
        let mut cursor = SharedCursor {
            arena: &self.arena,
            visit: move |node: &TreeNode| -> Walk { visit(node).into() },
            post,
        };
        traverse::descend(&mut cursor, start);
    }

    /// Read-only counterpart of [`Tree::traverse_up`].
    pub fn walk_up<F, R>(&self, start: NodeId, mut visit: F)
    where
        F: FnMut(&TreeNode) -> R,
        R: Into<Walk>,
    {
        let mut cursor = SharedCursor {
            arena: &self.arena,
            visit: move |node: &TreeNode| -> Walk { visit(node).into() },
            post: |_: &TreeNode| {},
        };
        traverse::ascend(&mut cursor, start);
    }

    /// Read-only counterpart of [`Tree::bubble_up`].
    pub fn walk_bubble_up<F, R>(&self, start: NodeId, mut visit: F)
    where
        F: FnMut(&TreeNode) -> R,
        R: Into<Walk>,
    {
        let mut cursor = SharedCursor {
            arena: &self.arena,
            visit: move |node: &TreeNode| -> Walk { visit(node).into() },
            post: |_: &TreeNode| {},
        };
        traverse::bubble(&mut cursor, start);
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    /// Follows parent links from `id` to the topmost node.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current).filter(|&p| self.contains(p)) {
            current = parent;
        }
        current
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(TreeNode::is_root)
    }

    /// `start` followed by all its descendants in pre-order.
    #[instrument(level = "trace", skip(self))]
    pub fn to_vec(&self, start: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        self.walk_down(start, |node| nodes.push(node.handle));
        nodes
    }

    /// Number of nodes in the subtree of `start`, `start` included.
    pub fn len(&self, start: NodeId) -> usize {
        self.to_vec(start).len()
    }

    /// First node in pre-order from `start` matching `predicate`.
    pub fn find<F>(&self, start: NodeId, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(&TreeNode) -> bool,
    {
        let mut found = None;
        self.walk_down(start, |node| {
            if predicate(node) {
                found = Some(node.handle);
                Walk::Stop
            } else {
                Walk::Continue
            }
        });
        found
    }

    /// First node in pre-order from `start` whose id equals `id`.
    pub fn find_id(&self, start: NodeId, id: &str) -> Option<NodeId> {
        self.find(start, |node| node.id == id)
    }

    /// Resolves an index path such as `"/1/0"` relative to `start`.
    ///
    /// Tokens are child positions, not ids. A leading separator is ignored.
    /// Any token that is not a position of an existing child yields `None`.
    pub fn path(&self, start: NodeId, path: &str, separator: Option<char>) -> Option<NodeId> {
        let separator = separator.unwrap_or(DEFAULT_SEPARATOR);
        let path = path.strip_prefix(separator).unwrap_or(path);
        let mut current = self.get(start)?.handle;
        for token in path.split(separator) {
            let index: usize = token.parse().ok()?;
            current = *self.children(current).get(index)?;
        }
        Some(current)
    }

    /// Pre-order iterator over the subtree of `start`.
    pub fn iter(&self, start: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, start)
    }

    /// Post-order iterator over the subtree of `start`.
    pub fn iter_postorder(&self, start: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, start)
    }

    /// Number of levels below and including `start`, 0 for a missing node.
    #[instrument(level = "trace", skip(self))]
    pub fn height(&self, start: NodeId) -> usize {
        let mut height = 0;
        let mut stack = vec![(start, 1)];
        while let Some((id, level)) = stack.pop() {
            if let Some(node) = self.get(id) {
                height = height.max(level);
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        height
    }

    /// Leaf nodes of the subtree of `start` in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self, start: NodeId) -> Vec<NodeId> {
        self.iter(start)
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, _)| id)
            .collect()
    }
}

impl Index<NodeId> for Tree {
    type Output = TreeNode;

    /// # Panics
    /// When `id` is not in the arena.
    fn index(&self, id: NodeId) -> &TreeNode {
        &self.arena[id.index()]
    }
}

/// Mutable cursor returned by [`Tree::node_mut`].
///
/// ```
/// # use arboreal::domain::Tree;
/// let mut tree = Tree::new();
/// let root = tree.root();
/// tree.node_mut(root)?
///     .append_child(None, None)?
///     .append_child(None, None)?;
/// assert_eq!(tree.len(root), 3);
/// # Ok::<(), arboreal::domain::TreeError>(())
/// ```
#[derive(Debug)]
pub struct NodeMut<'a> {
    tree: &'a mut Tree,
    id: NodeId,
}

impl NodeMut<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &TreeNode {
        &self.tree[self.id]
    }

    pub fn append_child(
        &mut self,
        data: Option<NodeData>,
        id: Option<&str>,
    ) -> TreeResult<&mut Self> {
        self.tree.append_child(self.id, data, id)?;
        Ok(self)
    }

    pub fn append_children(
        &mut self,
        source: &serde_json::Value,
        children_key: &str,
    ) -> TreeResult<&mut Self> {
        self.tree.append_children(self.id, source, children_key)?;
        Ok(self)
    }
}

pub struct TreeIterator<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push(start);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push((start, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, expanded)) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                if expanded {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
