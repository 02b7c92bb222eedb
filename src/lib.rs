//! Ordered multi-way trees with positional ids, index paths and
//! abortable traversals.
//!
//! Nodes live in an arena owned by [`domain::Tree`] and are addressed by
//! stable [`domain::NodeId`] handles. Every node also carries a string id
//! derived from its position at creation time (`"0"`, `"0/1"`, `"0/1/0"`, ...),
//! a depth, a separator and an arbitrary JSON object as payload.
//!
//! ```
//! use arboreal::domain::{Tree, Walk};
//!
//! let mut tree = Tree::new();
//! let root = tree.root();
//! tree.append_child(root, None, None)?;
//! tree.append_child(root, None, None)?;
//!
//! assert_eq!(tree.find_id(root, "0/1").map(|id| tree[id].id()), Some("0/1"));
//! assert_eq!(tree.to_string(), "0\n |- 0/0\n |- 0/1");
//!
//! let mut seen = 0;
//! tree.walk_down(root, |_| {
//!     seen += 1;
//!     if seen == 2 { Walk::Stop } else { Walk::Continue }
//! });
//! assert_eq!(seen, 2);
//! # Ok::<(), arboreal::domain::TreeError>(())
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use domain::{ChildRef, NodeData, NodeId, NodeOptions, Tree, TreeError, TreeNode, Walk};
