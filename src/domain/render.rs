//! Human-readable projections of a tree.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use termtree::Tree as TermTree;

use crate::domain::arena::Tree;
use crate::domain::node::{NodeId, TreeNode};

/// Prefix of every non-root outline line, after the indentation.
pub const OUTLINE_MARKER: &str = "|- ";

impl Tree {
    /// Line-per-node outline of the subtree of `start`.
    ///
    /// Nodes at depth 0 print their id alone; deeper nodes are indented by
    /// one space per depth level and prefixed with [`OUTLINE_MARKER`]. With
    /// `include_data` each id is followed by the node data as compact JSON.
    pub fn outline(&self, start: NodeId, include_data: bool) -> String {
        let mut lines = Vec::new();
        self.walk_down(start, |node| lines.push(outline_line(node, include_data)));
        lines.join("\n")
    }

    /// Box-drawing rendering of the subtree of `start` for terminals.
    pub fn to_termtree(&self, start: NodeId) -> Option<TermTree<String>> {
        let mut built: HashMap<NodeId, TermTree<String>> = HashMap::new();
        for (id, node) in self.iter_postorder(start) {
            let leaves: Vec<_> = node
                .children()
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(id, TermTree::new(node.id().to_string()).with_leaves(leaves));
        }
        built.remove(&start)
    }
}

fn outline_line(node: &TreeNode, include_data: bool) -> String {
    let mut line = if node.depth() == 0 {
        node.id().to_string()
    } else {
        format!("{}{OUTLINE_MARKER}{}", " ".repeat(node.depth()), node.id())
    };
    if include_data {
        line.push(' ');
        line.push_str(&Value::Object(node.data().clone()).to_string());
    }
    line
}

/// Outline of the whole tree without data.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.outline(self.root(), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outline_of_two_children() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, None, None).unwrap();
        tree.append_child(root, None, None).unwrap();
        assert_eq!(tree.to_string(), "0\n |- 0/0\n |- 0/1");
    }

    #[test]
    fn test_outline_with_data() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, json!({"name": "x"}).as_object().cloned(), None)
            .unwrap();
        assert_eq!(tree.outline(root, true), "0 {}\n |- 0/0 {\"name\":\"x\"}");
    }

    #[test]
    fn test_termtree_rendering() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, None, None).unwrap();
        let rendered = tree.to_termtree(root).unwrap().to_string();
        assert!(rendered.starts_with("0\n"));
        assert!(rendered.contains("└── 0/0"));
    }
}
