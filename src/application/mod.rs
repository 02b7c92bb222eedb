//! Application layer: services and use cases
//!
//! This layer loads documents, applies settings and orchestrates domain logic.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
