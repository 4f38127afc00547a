//! Graph-specific error types.

use rag_core::RagError;
use thiserror::Error;

/// Result type for graph store operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors reported by the graph store.
///
/// None of these are fatal: every mutation is checked before it is applied,
/// so an error always means "nothing changed".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A process or resource with this name is already registered.
    #[error("Node '{name}' already exists")]
    DuplicateName { name: String },

    /// Instance count is not a positive integer.
    #[error("Invalid instance count '{input}': expected a positive integer")]
    InvalidCapacity { input: String },

    /// No node with this name is registered.
    #[error("Node '{name}' does not exist")]
    UnknownNode { name: String },

    /// The node exists but is the other kind.
    #[error("Node '{name}' is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    /// Allocation attempted without an outstanding request edge.
    #[error("Process '{process}' has no pending request for resource '{resource}'")]
    NoPendingRequest { process: String, resource: String },

    /// Every instance of the resource is already allocated.
    #[error("Resource '{resource}' is fully allocated ({allocated}/{total})")]
    CapacityExhausted {
        resource: String,
        allocated: u32,
        total: u32,
    },

    /// Internal consistency check failed.
    #[error("Graph invariant violated: {what}")]
    Invariant { what: String },

    /// A thread panicked while holding the shared graph lock.
    #[error("Shared graph lock is poisoned")]
    Poisoned,
}

impl From<GraphError> for RagError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::DuplicateName { .. }
            | GraphError::InvalidCapacity { .. }
            | GraphError::WrongKind { .. }
            | GraphError::CapacityExhausted { .. } => RagError::InvalidArg {
                what: err.to_string(),
            },
            GraphError::UnknownNode { .. } | GraphError::NoPendingRequest { .. } => {
                RagError::NotFound {
                    what: err.to_string(),
                }
            }
            GraphError::Invariant { .. } | GraphError::Poisoned => RagError::Invariant {
                what: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_core_error() {
        let err: RagError = GraphError::UnknownNode { name: "P9".into() }.into();
        assert_eq!(
            err,
            RagError::NotFound {
                what: "Node 'P9' does not exist".into()
            }
        );

        let err: RagError = GraphError::Poisoned.into();
        assert!(matches!(err, RagError::Invariant { .. }));
    }
}
