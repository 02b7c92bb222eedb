//! Conversion between trees and nested JSON objects.
//!
//! Each level of the nested shape is an object; one caller-chosen field holds
//! the array of child levels and every other field becomes node data.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::arena::Tree;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::{NodeData, NodeId, NodeOptions, DEFAULT_SEPARATOR};

/// Location of the top level in [`TreeError::InvalidSource`] messages.
const SOURCE_ROOT: &str = "#";

impl Tree {
    /// Builds a tree from nested objects whose children live under `children_key`.
    ///
    /// ```
    /// # use arboreal::domain::Tree;
    /// # use serde_json::json;
    /// let source = json!({"a": 1, "children": [{"a": 2}, {"a": 3, "children": [{"a": 4}]}]});
    /// let tree = Tree::parse(&source, "children")?;
    /// let root = tree.root();
    /// assert_eq!(tree.len(root), 4);
    /// let deep = tree.path(root, "1/0", None).unwrap();
    /// assert_eq!(tree[deep].data()["a"], 4);
    /// # Ok::<(), arboreal::domain::TreeError>(())
    /// ```
    pub fn parse(source: &Value, children_key: &str) -> TreeResult<Self> {
        Self::parse_with_separator(source, children_key, DEFAULT_SEPARATOR)
    }

    /// Like [`Tree::parse`], deriving ids with `separator`.
    #[instrument(level = "debug", skip(source))]
    pub fn parse_with_separator(
        source: &Value,
        children_key: &str,
        separator: char,
    ) -> TreeResult<Self> {
        let level = as_level(source, SOURCE_ROOT)?;
        let data = level_data(level, children_key);
        let mut tree = Self::with_root(NodeOptions::new().data(data).separator(separator));
        let root = tree.root();
        let pending = child_levels(root, level, children_key, SOURCE_ROOT)?;
        tree.insert_levels(pending, children_key)?;
        debug!("parsed {} nodes", tree.node_count());
        Ok(tree)
    }

    /// Parses `source` and appends the resulting subtree under `parent`.
    ///
    /// Either the whole subtree is appended or, on a malformed source,
    /// nothing is. Returns `parent`.
    #[instrument(level = "debug", skip(self, source))]
    pub fn append_children(
        &mut self,
        parent: NodeId,
        source: &Value,
        children_key: &str,
    ) -> TreeResult<NodeId> {
        let before = self
            .get(parent)
            .ok_or(TreeError::NodeNotFound(parent))?
            .children()
            .len();
        let pending = vec![PendingLevel {
            parent,
            source,
            location: SOURCE_ROOT.to_string(),
        }];
        if let Err(e) = self.insert_levels(pending, children_key) {
            let partial = self.children(parent).get(before).copied();
            if let Some(partial) = partial {
                let freed = self.discard(partial)?;
                debug!("rolled back {freed} nodes of a malformed source");
            }
            return Err(e);
        }
        Ok(parent)
    }

    /// Inserts pending levels in pre-order until none are left.
    fn insert_levels(
        &mut self,
        mut stack: Vec<PendingLevel<'_>>,
        children_key: &str,
    ) -> TreeResult<()> {
        // reversed so that siblings are inserted, and numbered, in order
        stack.reverse();
        while let Some(PendingLevel {
            parent,
            source,
            location,
        }) = stack.pop()
        {
            let level = as_level(source, &location)?;
            let data = level_data(level, children_key);
            let node = self.insert_child(parent, NodeOptions::new().data(data))?;
            let children = child_levels(node, level, children_key, &location)?;
            stack.extend(children.into_iter().rev());
        }
        Ok(())
    }

    /// Exports the subtree of `start` into the shape accepted by [`Tree::parse`].
    ///
    /// Leaves carry no `children_key` field. Returns `None` for a missing node.
    pub fn to_value(&self, start: NodeId, children_key: &str) -> Option<Value> {
        let mut built: HashMap<NodeId, Value> = HashMap::new();
        for (id, node) in self.iter_postorder(start) {
            let mut level = node.data().clone();
            if !node.children().is_empty() {
                let children = node
                    .children()
                    .iter()
                    .filter_map(|child| built.remove(child))
                    .collect();
                level.insert(children_key.to_string(), Value::Array(children));
            }
            built.insert(id, Value::Object(level));
        }
        built.remove(&start)
    }
}

/// A source level waiting to be inserted under `parent`.
struct PendingLevel<'a> {
    parent: NodeId,
    source: &'a Value,
    location: String,
}

/// Child levels of `level`, to be inserted under `node`.
fn child_levels<'a>(
    node: NodeId,
    level: &'a Map<String, Value>,
    children_key: &str,
    location: &str,
) -> TreeResult<Vec<PendingLevel<'a>>> {
    let Some(children) = level.get(children_key) else {
        return Ok(Vec::new());
    };
    let children = children
        .as_array()
        .ok_or_else(|| TreeError::InvalidSource {
            location: format!("{location}/{children_key}"),
            reason: format!("expected an array, found {}", kind(children)),
        })?;
    Ok(children
        .iter()
        .enumerate()
        .map(|(position, source)| PendingLevel {
            parent: node,
            source,
            location: format!("{location}/{children_key}/{position}"),
        })
        .collect())
}

fn as_level<'a>(source: &'a Value, location: &str) -> TreeResult<&'a Map<String, Value>> {
    source.as_object().ok_or_else(|| TreeError::InvalidSource {
        location: location.to_string(),
        reason: format!("expected an object, found {}", kind(source)),
    })
}

/// Shallow copy of a level without its children field.
fn level_data(level: &Map<String, Value>, children_key: &str) -> NodeData {
    level
        .iter()
        .filter(|(key, _)| key.as_str() != children_key)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_data_skips_children_key() {
        let level = json!({"name": "a", "kids": [], "n": 1});
        let data = level_data(level.as_object().unwrap(), "kids");
        assert_eq!(Value::Object(data), json!({"name": "a", "n": 1}));
    }

    #[test]
    fn test_parse_leaf_without_children_key() {
        let tree = Tree::parse(&json!({"name": "alone"}), "children").unwrap();
        let root = tree.root();
        assert_eq!(tree.len(root), 1);
        assert_eq!(tree[root].id(), "0");
        assert_eq!(tree[root].data()["name"], "alone");
    }

    #[test]
    fn test_parse_rejects_non_object_level() {
        let err = Tree::parse(&json!({"children": [{"a": 1}, 7]}), "children").unwrap_err();
        assert_eq!(
            err,
            TreeError::InvalidSource {
                location: "#/children/1".to_string(),
                reason: "expected an object, found a number".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_array_children() {
        let err = Tree::parse(&json!({"children": "nope"}), "children").unwrap_err();
        assert!(matches!(err, TreeError::InvalidSource { location, .. } if location == "#/children"));
    }

    #[test]
    fn test_append_children_rolls_back_malformed_source() {
        let mut tree = Tree::new();
        let root = tree.root();
        let source = json!({"a": 1, "children": [{"b": 2}, 7]});

        let err = tree.append_children(root, &source, "children").unwrap_err();

        assert!(matches!(err, TreeError::InvalidSource { location, .. } if location == "#/children/1"));
        assert_eq!(tree.len(root), 1);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.to_string(), "0");
    }

    #[test]
    fn test_to_value_restores_shape() {
        let source = json!({"a": 1, "children": [{"a": 2}, {"a": 3, "children": [{"a": 4}]}]});
        let tree = Tree::parse(&source, "children").unwrap();
        assert_eq!(tree.to_value(tree.root(), "children"), Some(source));
    }
}
