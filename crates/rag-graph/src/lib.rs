//! rag-graph: the resource allocation graph store.
//!
//! Provides:
//! - Node/edge model (processes, resources, request and allocation edges)
//! - `ResourceGraph` with the add/request/allocate/release/reset operations
//! - Invariant checks and the allocation summary read model
//! - `SharedGraph` for access from several threads
//!
//! # Example
//!
//! ```
//! use rag_graph::{Capacity, ResourceGraph};
//!
//! let mut graph = ResourceGraph::new();
//! graph.add_process("P1");
//! graph.add_resource("R1", Capacity::ONE);
//! graph.request("P1", "R1");
//! assert!(graph.allocate("P1", "R1"));
//! assert_eq!(graph.resource_usage("R1"), Some((1, 1)));
//! ```

pub mod capacity;
pub mod error;
pub mod graph;
pub mod shared;
pub mod summary;
pub mod validate;

pub use capacity::Capacity;
pub use error::{GraphError, GraphResult};
pub use graph::{Edge, EdgeKind, Node, NodeKind, ResourceGraph};
pub use shared::SharedGraph;
pub use summary::{AllocationSummary, ProcessRow, ProcessStatus, ResourceRow, ResourceStatus};
pub use validate::check_invariants;
