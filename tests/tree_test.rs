//! Tests for tree construction, mutation and queries

use rstest::{fixture, rstest};
use serde_json::json;

use arboreal::domain::{ChildRef, NodeId, NodeOptions, Tree, TreeError};
use arboreal::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

/// Root with four children, the first of which has two children.
#[fixture]
fn tree() -> Tree {
    let mut tree = Tree::new();
    let root = tree.root();
    tree.node_mut(root)
        .unwrap()
        .append_child(None, None)
        .unwrap()
        .append_child(None, None)
        .unwrap()
        .append_child(None, None)
        .unwrap()
        .append_child(None, None)
        .unwrap();
    let first = tree.children(root)[0];
    tree.node_mut(first)
        .unwrap()
        .append_child(None, None)
        .unwrap()
        .append_child(None, None)
        .unwrap();
    tree
}

fn ids(tree: &Tree, nodes: &[NodeId]) -> Vec<String> {
    nodes.iter().map(|&n| tree[n].id().to_string()).collect()
}

// ============================================================
// Construction
// ============================================================

#[test]
fn given_new_tree_when_created_then_root_id_is_zero() {
    let tree = Tree::new();
    assert_eq!(tree[tree.root()].id(), "0");
}

#[test]
fn given_explicit_id_and_data_when_created_then_both_are_kept() {
    let data = json!({"myCustomAttr": true}).as_object().cloned().unwrap();
    let tree = Tree::with_root(NodeOptions::new().id("myId").data(data));
    let root = &tree[tree.root()];
    assert_eq!(root.id(), "myId");
    assert_eq!(root.data()["myCustomAttr"], json!(true));
}

#[test]
fn given_child_with_explicit_id_when_appended_then_id_and_parent_are_set() {
    let mut tree = Tree::new();
    let root = tree.root();
    let data = json!({"myCustomAttr": true}).as_object().cloned();

    let returned = tree.append_child(root, data, Some("myId")).unwrap();

    assert_eq!(returned, root, "append_child returns the receiver");
    assert_eq!(tree.children(root).len(), 1);
    let child = tree.children(root)[0];
    assert_eq!(tree[child].id(), "myId");
    assert_eq!(tree.parent(child), Some(root));
    assert_eq!(tree[child].depth(), 1);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
#[case(20)]
fn given_n_appends_when_measured_then_length_is_n_plus_one(#[case] n: usize) {
    let mut tree = Tree::new();
    let root = tree.root();
    for _ in 0..n {
        tree.append_child(root, None, None).unwrap();
    }
    assert_eq!(tree.len(root), n + 1);
    assert_eq!(tree.to_vec(root)[0], root);
}

#[rstest]
fn given_fixture_when_reading_ids_then_ids_follow_positions(tree: Tree) {
    let root = tree.root();
    assert_eq!(
        ids(&tree, &tree.to_vec(root)),
        ["0", "0/0", "0/0/0", "0/0/1", "0/1", "0/2", "0/3"]
    );
    let grandchild = tree.children(tree.children(root)[0])[1];
    assert_eq!(tree[grandchild].depth(), 2);
}

// ============================================================
// Removal
// ============================================================

#[rstest]
fn given_child_reference_when_removed_then_same_reference_is_returned(mut tree: Tree) {
    let root = tree.root();
    let third = tree.children(root)[2];

    let removed = tree.remove_child(root, third).unwrap();

    assert_eq!(removed, Some(third));
    assert_eq!(tree.children(root).len(), 3);
    assert!(!tree.children(root).contains(&third));
    // no renumbering after removal
    assert_eq!(tree[tree.children(root)[2]].id(), "0/3");
}

#[rstest]
fn given_index_when_removed_then_child_at_position_is_returned(mut tree: Tree) {
    let root = tree.root();
    let first = tree.children(root)[0];
    let second_grandchild = tree.children(first)[1];

    let removed = tree.remove_child(first, 1usize).unwrap();

    assert_eq!(removed, Some(second_grandchild));
    assert_eq!(tree[second_grandchild].id(), "0/0/1");
    assert_eq!(tree.children(first).len(), 1);
}

#[rstest]
fn given_removed_node_when_inspected_then_it_is_a_detached_root(mut tree: Tree) {
    let root = tree.root();
    let first = tree.children(root)[0];

    let removed = tree.remove_child(root, ChildRef::Index(0)).unwrap().unwrap();

    assert_eq!(removed, first);
    assert!(tree.is_root(first));
    assert_eq!(tree.root_of(first), first);
    assert_eq!(tree.len(first), 3, "subtree travels with the node");
    assert_eq!(tree.len(root), 4);
    assert_eq!(tree[first].depth(), 1, "depth is not re-derived");
}

#[rstest]
fn given_non_child_reference_when_removed_then_nothing_happens(mut tree: Tree) {
    let root = tree.root();
    let grandchild = tree.children(tree.children(root)[0])[0];

    let removed = tree.remove_child(root, grandchild).unwrap();

    assert_eq!(removed, None);
    assert_eq!(tree.children(root).len(), 4);
    assert_eq!(tree.len(root), 7);
}

#[rstest]
#[case(4)]
#[case(100)]
fn given_out_of_bounds_index_when_removed_then_invalid_argument(
    mut tree: Tree,
    #[case] index: usize,
) {
    let root = tree.root();
    let result = tree.remove_child(root, index);
    assert!(matches!(result, Err(TreeError::InvalidArgument(_))));
    assert_eq!(tree.children(root).len(), 4);
}

#[rstest]
fn given_token_that_is_neither_index_nor_node_when_resolved_then_invalid_argument(tree: Tree) {
    let root = tree.root();
    assert_eq!(tree.child_ref(root, "2"), Ok(ChildRef::Index(2)));
    assert_eq!(
        tree.child_ref(root, "0/3"),
        Ok(ChildRef::Node(tree.children(root)[3]))
    );
    assert!(matches!(
        tree.child_ref(root, "no-such-node"),
        Err(TreeError::InvalidArgument(_))
    ));
}

#[rstest]
fn given_child_when_remove_called_on_it_then_parent_no_longer_lists_it(mut tree: Tree) {
    let root = tree.root();
    let last = tree.children(root)[3];

    assert_eq!(tree.remove(last), Ok(Some(last)));
    assert_eq!(tree.children(root).len(), 3);
}

#[rstest]
fn given_root_when_remove_called_then_no_parent_error(mut tree: Tree) {
    let root = tree.root();
    assert_eq!(tree.remove(root), Err(TreeError::NoParent("0".to_string())));
    assert_eq!(tree.len(root), 7);
}

#[test]
fn given_bare_node_when_removed_then_parent_does_not_list_it() {
    let mut tree = Tree::new();
    let root = tree.root();
    let bare = tree.create_node(Some(root), NodeOptions::new()).unwrap();
    assert_eq!(tree.remove(bare), Ok(None));
}

#[rstest]
fn given_discarded_node_when_mutated_then_node_not_found(mut tree: Tree) {
    let root = tree.root();
    let first = tree.children(root)[0];
    tree.discard(first).unwrap();

    assert_eq!(
        tree.append_child(first, None, None),
        Err(TreeError::NodeNotFound(first))
    );
    assert_eq!(tree.len(first), 0);
    assert_eq!(tree.len(root), 4);
}

// ============================================================
// Queries
// ============================================================

#[rstest]
fn given_any_node_when_root_taken_twice_then_result_is_stable(tree: Tree) {
    let root = tree.root();
    for node in tree.to_vec(root) {
        let top = tree.root_of(node);
        assert_eq!(top, root);
        assert_eq!(tree.root_of(top), top);
    }
}

#[rstest]
fn given_nodes_when_checked_then_only_parentless_is_root(tree: Tree) {
    let root = tree.root();
    for node in tree.to_vec(root) {
        assert_eq!(tree.is_root(node), tree.parent(node).is_none());
    }
    assert!(tree.is_root(root));
}

#[rstest]
fn given_id_when_found_then_matching_node_is_returned(tree: Tree) {
    let root = tree.root();
    let found = tree.find_id(root, "0/3").unwrap();
    assert_eq!(tree[found].id(), "0/3");
    assert_eq!(tree.find_id(root, "0/9"), None);
}

#[rstest]
fn given_predicate_when_found_then_first_preorder_match_is_returned(tree: Tree) {
    let root = tree.root();
    let found = tree.find(root, |node| node.depth() == 2).unwrap();
    assert_eq!(tree[found].id(), "0/0/0");
    assert_eq!(tree.find(root, |node| node.depth() == 3), None);
}

#[rstest]
#[case("/3", Some("0/3"))]
#[case("3", Some("0/3"))]
#[case("0/1", Some("0/0/1"))]
#[case("/0/1", Some("0/0/1"))]
#[case("5", None)]
#[case("0/2", None)]
#[case("1/0", None)]
#[case("x", None)]
#[case("", None)]
fn given_index_path_when_resolved_then_expected_node(
    tree: Tree,
    #[case] path: &str,
    #[case] expected: Option<&str>,
) {
    let root = tree.root();
    let found = tree.path(root, path, None).map(|n| tree[n].id().to_string());
    assert_eq!(found.as_deref(), expected);
}

#[test]
fn given_three_children_when_path_resolved_then_second_child_is_returned() {
    let mut tree = Tree::new();
    let root = tree.root();
    let a = tree.insert_child(root, NodeOptions::new().id("A")).unwrap();
    let b = tree.insert_child(root, NodeOptions::new().id("B")).unwrap();
    let _c = tree.insert_child(root, NodeOptions::new().id("C")).unwrap();

    assert_eq!(tree.path(root, "/1", None), Some(b));
    assert_eq!(tree.path(root, "5", None), None);
    assert_eq!(tree.path(root, "0", None), Some(a));
}

#[rstest]
fn given_subtree_when_path_resolved_then_indices_are_relative(tree: Tree) {
    let first = tree.children(tree.root())[0];
    let found = tree.path(first, "1", None).unwrap();
    assert_eq!(tree[found].id(), "0/0/1");
}

#[rstest]
fn given_custom_separator_when_path_resolved_then_tokens_split_on_it(tree: Tree) {
    let root = tree.root();
    let found = tree.path(root, ".0.1", Some('.')).unwrap();
    assert_eq!(tree[found].id(), "0/0/1");
}

#[test]
fn given_two_children_when_rendered_then_outline_matches() {
    let mut tree = Tree::new();
    let root = tree.root();
    tree.append_child(root, None, None).unwrap();
    tree.append_child(root, None, None).unwrap();

    assert_eq!(tree.find_id(root, "0/1"), Some(tree.children(root)[1]));
    assert_eq!(tree.to_string(), "0\n |- 0/0\n |- 0/1");
}

#[rstest]
fn given_fixture_when_rendered_then_indentation_equals_depth(tree: Tree) {
    let expected = "0\n |- 0/0\n  |- 0/0/0\n  |- 0/0/1\n |- 0/1\n |- 0/2\n |- 0/3";
    assert_eq!(tree.outline(tree.root(), false), expected);
}

#[rstest]
fn given_fixture_when_projected_then_every_id_is_non_empty(tree: Tree) {
    let root = tree.root();
    let nodes = tree.to_vec(root);
    assert_eq!(nodes.len(), 7);
    assert!(nodes.iter().all(|&n| !tree[n].id().is_empty()));
}
