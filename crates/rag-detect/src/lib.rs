//! rag-detect: deadlock analysis for the resource allocation graph.
//!
//! Provides:
//! - Directed cycle search (`find_cycle`)
//! - Two-phase deadlock detection with capacity validation (`detect_deadlock`)
//! - Explanations and release suggestions for a confirmed cycle
//! - `DeadlockMonitor`, reporting each deadlock episode once across scans

pub mod analyzer;
pub mod cycle;
pub mod explain;
pub mod monitor;

pub use analyzer::{CycleEdge, DeadlockCycle, DetectDeadlock, detect_deadlock};
pub use cycle::find_cycle;
pub use explain::{Explanation, Fact, ReleaseAction, explain};
pub use monitor::{DeadlockMonitor, DeadlockNotice, MonitorState};
