//! rag-core: stable foundation for the resource allocation graph workspace.
//!
//! Contains:
//! - ids (compact node identifiers shared by processes and resources)
//! - error (shared error type)

pub mod error;
pub mod ids;

pub use error::{RagError, RagResult};
pub use ids::*;
