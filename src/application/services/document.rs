//! Document service
//!
//! Loads nested JSON documents into trees and runs the command line queries
//! against them, using the configured separator and children key.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{NodeData, NodeId, Tree};

/// Printable summary of a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeReport {
    pub id: String,
    pub depth: usize,
    pub children: usize,
    pub data: NodeData,
}

impl NodeReport {
    fn new(tree: &Tree, node: NodeId) -> Option<Self> {
        let node = tree.get(node)?;
        Some(Self {
            id: node.id().to_string(),
            depth: node.depth(),
            children: node.children().len(),
            data: node.data().clone(),
        })
    }
}

/// Service turning JSON documents into trees.
pub struct DocumentService {
    settings: Settings,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read and parse the JSON document at `path` into a tree.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Tree> {
        let content = fs::read_to_string(path).with_path_context("read document", path)?;
        let source: Value =
            serde_json::from_str(&content).map_err(|source| ApplicationError::Document {
                path: path.to_path_buf(),
                source,
            })?;
        self.parse(&source)
    }

    /// Parse an in-memory document into a tree.
    pub fn parse(&self, source: &Value) -> ApplicationResult<Tree> {
        let tree = Tree::parse_with_separator(
            source,
            &self.settings.children_key,
            self.settings.separator,
        )?;
        debug!("loaded tree with {} nodes", tree.len(tree.root()));
        Ok(tree)
    }

    /// Handle of the node with id `id`, searched from the root.
    pub fn node_by_id(&self, tree: &Tree, id: &str) -> ApplicationResult<NodeId> {
        tree.find_id(tree.root(), id)
            .ok_or_else(|| ApplicationError::UnknownNode(id.to_string()))
    }

    /// Summary of the node with id `id`.
    pub fn describe(&self, tree: &Tree, id: &str) -> ApplicationResult<NodeReport> {
        let node = self.node_by_id(tree, id)?;
        NodeReport::new(tree, node).ok_or_else(|| ApplicationError::UnknownNode(id.to_string()))
    }

    /// Summary of the node at index path `path` below the root, if any.
    pub fn resolve_path(&self, tree: &Tree, path: &str) -> Option<NodeReport> {
        let node = tree.path(tree.root(), path, Some(self.settings.separator))?;
        NodeReport::new(tree, node)
    }

    /// Ids of the leaves of the whole tree in pre-order.
    pub fn leaf_ids(&self, tree: &Tree) -> Vec<String> {
        tree.leaves(tree.root())
            .into_iter()
            .map(|leaf| tree[leaf].id().to_string())
            .collect()
    }

    /// Detach the child `child` (position or node id) of the node `parent_id`.
    ///
    /// Returns the id of the detached node, or `None` when `child` names a
    /// node that is not a child of `parent_id`.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn remove_child(
        &self,
        tree: &mut Tree,
        parent_id: &str,
        child: &str,
    ) -> ApplicationResult<Option<String>> {
        let parent = self.node_by_id(tree, parent_id)?;
        let child = tree.child_ref(tree.root(), child)?;
        let removed = tree.remove_child(parent, child)?;
        Ok(removed.map(|node| tree[node].id().to_string()))
    }

    /// Export the whole tree back into the nested document shape.
    pub fn export(&self, tree: &Tree) -> Value {
        tree.to_value(tree.root(), &self.settings.children_key)
            .unwrap_or(Value::Null)
    }

    /// Pretty-printed JSON of [`DocumentService::export`].
    pub fn export_json(&self, tree: &Tree) -> ApplicationResult<String> {
        serde_json::to_string_pretty(&self.export(tree))
            .map_err(|source| ApplicationError::Export { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> DocumentService {
        DocumentService::new(Settings::default())
    }

    fn menu() -> Value {
        json!({
            "label": "File",
            "children": [
                {"label": "New"},
                {"label": "Open", "children": [{"label": "Recent"}]},
                {"label": "Quit"}
            ]
        })
    }

    #[test]
    fn test_describe_reports_node() {
        let service = service();
        let tree = service.parse(&menu()).unwrap();
        let report = service.describe(&tree, "0/1").unwrap();
        assert_eq!(report.id, "0/1");
        assert_eq!(report.depth, 1);
        assert_eq!(report.children, 1);
        assert_eq!(report.data["label"], "Open");
    }

    #[test]
    fn test_describe_unknown_node_errors() {
        let service = service();
        let tree = service.parse(&menu()).unwrap();
        assert!(matches!(
            service.describe(&tree, "9/9"),
            Err(ApplicationError::UnknownNode(id)) if id == "9/9"
        ));
    }

    #[test]
    fn test_remove_child_by_index_and_by_id() {
        let service = service();
        let mut tree = service.parse(&menu()).unwrap();

        assert_eq!(
            service.remove_child(&mut tree, "0", "2").unwrap(),
            Some("0/2".to_string())
        );
        assert_eq!(
            service.remove_child(&mut tree, "0", "0/0").unwrap(),
            Some("0/0".to_string())
        );
        // 0/1/0 exists but is not a child of the root
        assert_eq!(service.remove_child(&mut tree, "0", "0/1/0").unwrap(), None);
        assert_eq!(service.leaf_ids(&tree), ["0/1/0"]);
    }

    #[test]
    fn test_remove_child_with_unknown_token_is_invalid_argument() {
        let service = service();
        let mut tree = service.parse(&menu()).unwrap();
        let err = service.remove_child(&mut tree, "0", "nope").unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Tree(crate::domain::TreeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_export_json_renders_nested_shape() {
        let service = service();
        let tree = service.parse(&menu()).unwrap();
        let json = service.export_json(&tree).unwrap();
        let reparsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, menu());
    }

    #[test]
    fn test_resolve_path_with_custom_separator() {
        let settings = Settings {
            separator: '.',
            ..Settings::default()
        };
        let service = DocumentService::new(settings);
        let tree = service.parse(&menu()).unwrap();
        let report = service.resolve_path(&tree, ".1.0").unwrap();
        assert_eq!(report.id, "0.1.0");
        assert!(service.resolve_path(&tree, ".7").is_none());
    }
}
