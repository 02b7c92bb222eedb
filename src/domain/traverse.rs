//! Traversal engine shared by the read-only and mutating walks.
//!
//! Three walks exist:
//! - descent: pre-order from the start node, with an optional callback on
//!   every child once its subtree is done
//! - ascent: the start node and its children, then the parent and its
//!   children, up to the root level
//! - bubble-up: the start node and its ancestors only
//!
//! Every walk visits a node at most once, keyed by its arena handle, and
//! ends for good as soon as a visitor answers [`Walk::Stop`].

use std::collections::HashSet;
use std::ops::ControlFlow;

use generational_arena::Arena;

use crate::domain::node::{NodeId, TreeNode};

/// Answer of a visitor: keep walking or abort the whole traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Walk {
    #[default]
    Continue,
    Stop,
}

impl Walk {
    pub fn is_stop(self) -> bool {
        self == Walk::Stop
    }
}

impl From<()> for Walk {
    fn from((): ()) -> Self {
        Walk::Continue
    }
}

/// `false` stops, `true` continues.
impl From<bool> for Walk {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Walk::Continue
        } else {
            Walk::Stop
        }
    }
}

/// Arena access used by the walk algorithms.
pub(crate) trait Cursor {
    fn visit(&mut self, id: NodeId) -> Walk;
    fn post(&mut self, id: NodeId);
    /// Snapshot of the children at the time of the call.
    fn children(&self, id: NodeId) -> Vec<NodeId>;
    fn parent(&self, id: NodeId) -> Option<NodeId>;
}

/// Cursor handing out shared references.
pub(crate) struct SharedCursor<'a, V, P> {
    pub(crate) arena: &'a Arena<TreeNode>,
    pub(crate) visit: V,
    pub(crate) post: P,
}

impl<V, P> Cursor for SharedCursor<'_, V, P>
where
    V: FnMut(&TreeNode) -> Walk,
    P: FnMut(&TreeNode),
{
    fn visit(&mut self, id: NodeId) -> Walk {
        match self.arena.get(id.index()) {
            Some(node) => (self.visit)(node),
            None => Walk::Continue,
        }
    }

    fn post(&mut self, id: NodeId) {
        if let Some(node) = self.arena.get(id.index()) {
            (self.post)(node);
        }
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.arena
            .get(id.index())
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id.index()).and_then(|node| node.parent)
    }
}

/// Cursor handing out exclusive references, so visitors may edit ids and data.
pub(crate) struct ExclusiveCursor<'a, V, P> {
    pub(crate) arena: &'a mut Arena<TreeNode>,
    pub(crate) visit: V,
    pub(crate) post: P,
}

impl<V, P> Cursor for ExclusiveCursor<'_, V, P>
where
    V: FnMut(&mut TreeNode) -> Walk,
    P: FnMut(&mut TreeNode),
{
    fn visit(&mut self, id: NodeId) -> Walk {
        match self.arena.get_mut(id.index()) {
            Some(node) => (self.visit)(node),
            None => Walk::Continue,
        }
    }

    fn post(&mut self, id: NodeId) {
        if let Some(node) = self.arena.get_mut(id.index()) {
            (self.post)(node);
        }
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.arena
            .get(id.index())
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id.index()).and_then(|node| node.parent)
    }
}

/// Visits `id` unless it was seen before during this walk.
fn visit_once<C: Cursor>(
    cursor: &mut C,
    id: NodeId,
    visited: &mut HashSet<NodeId>,
) -> ControlFlow<()> {
    if visited.insert(id) && cursor.visit(id).is_stop() {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

/// A node whose children are being walked, with the position of the next one.
struct Frame {
    id: NodeId,
    children: Vec<NodeId>,
    next: usize,
}

/// Pre-order descent driven by an explicit stack of frames.
pub(crate) fn descend<C: Cursor>(cursor: &mut C, start: NodeId) {
    let mut visited = HashSet::new();
    visited.insert(start);
    if cursor.visit(start).is_stop() {
        return;
    }
    let mut stack = vec![Frame {
        id: start,
        children: cursor.children(start),
        next: 0,
    }];
    while let Some(frame) = stack.last_mut() {
        let Some(&child) = frame.children.get(frame.next) else {
            let done = frame.id;
            stack.pop();
            // the start node gets no post callback
            if !stack.is_empty() {
                cursor.post(done);
            }
            continue;
        };
        frame.next += 1;
        // already seen: neither visited again nor descended into
        if !visited.insert(child) {
            continue;
        }
        if cursor.visit(child).is_stop() {
            return;
        }
        stack.push(Frame {
            id: child,
            children: cursor.children(child),
            next: 0,
        });
    }
}

pub(crate) fn ascend<C: Cursor>(cursor: &mut C, start: NodeId) {
    let mut visited = HashSet::new();
    let _ = ascend_from(cursor, start, &mut visited);
}

fn ascend_from<C: Cursor>(
    cursor: &mut C,
    start: NodeId,
    visited: &mut HashSet<NodeId>,
) -> ControlFlow<()> {
    let mut current = Some(start);
    while let Some(id) = current {
        visit_once(cursor, id, visited)?;
        for child in cursor.children(id) {
            visit_once(cursor, child, visited)?;
        }
        current = cursor.parent(id);
    }
    ControlFlow::Continue(())
}

pub(crate) fn bubble<C: Cursor>(cursor: &mut C, start: NodeId) {
    let mut visited = HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if visit_once(cursor, id, &mut visited).is_break() {
            return;
        }
        current = cursor.parent(id);
    }
}
