//! Domain layer: the tree and its algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod node;
pub mod parse;
pub mod render;
pub mod traverse;

pub use arena::{ChildRef, NodeMut, PostOrderIterator, Tree, TreeIterator};
pub use error::{TreeError, TreeResult};
pub use node::{node_id, NodeData, NodeId, NodeOptions, TreeNode, DEFAULT_SEPARATOR, ROOT_ID};
pub use render::OUTLINE_MARKER;
pub use traverse::Walk;
