//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod document;

pub use document::{DocumentService, NodeReport};
