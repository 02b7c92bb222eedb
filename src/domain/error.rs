//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Errors raised by tree construction and mutation.
///
/// Lookups never fail loudly: a missing match is reported as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("node has no parent to be removed from: {0}")]
    NoParent(String),

    #[error("node not found in tree: {0}")]
    NodeNotFound(NodeId),

    #[error("invalid source at '{location}': {reason}")]
    InvalidSource { location: String, reason: String },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
