//! Two-phase deadlock detection: find a cycle, then check that it is real.

use std::fmt;

use rag_graph::{Edge, EdgeKind, ResourceGraph};
use serde::Serialize;
use tracing::debug;

use crate::cycle::find_cycle;

/// One edge of a confirmed deadlock cycle, by node name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl fmt::Display for CycleEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.kind)
    }
}

/// Ordered edges of a cycle in which every requested resource is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeadlockCycle {
    edges: Vec<CycleEdge>,
}

impl DeadlockCycle {
    pub fn edges(&self) -> &[CycleEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Processes in the cycle, in cycle order.
    pub fn processes(&self) -> impl Iterator<Item = &str> + '_ {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Request)
            .map(|e| e.from.as_str())
    }

    /// Resources in the cycle, in cycle order.
    pub fn resources(&self) -> impl Iterator<Item = &str> + '_ {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Request)
            .map(|e| e.to.as_str())
    }

    fn from_edges(graph: &ResourceGraph, edges: &[Edge]) -> Self {
        let name = |id| {
            graph
                .node_by_id(id)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        Self {
            edges: edges
                .iter()
                .map(|e| CycleEdge {
                    from: name(e.from),
                    to: name(e.to),
                    kind: e.kind,
                })
                .collect(),
        }
    }
}

impl fmt::Display for DeadlockCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, edge) in self.edges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{edge}")?;
        }
        Ok(())
    }
}

/// Report a deadlock cycle, if the graph has one.
///
/// Finds any cycle; if there is none, there is no deadlock. Otherwise each
/// process → resource edge of the cycle is checked, and a single target with
/// a free instance means the whole graph is reported deadlock-free. No other
/// cycle is tried. This is exact for single-instance resources and only a
/// heuristic once resources have several instances.
pub fn detect_deadlock(graph: &ResourceGraph) -> Option<DeadlockCycle> {
    let cycle = find_cycle(graph)?;

    for edge in &cycle {
        let (Some(from), Some(to)) = (graph.node_by_id(edge.from), graph.node_by_id(edge.to))
        else {
            continue;
        };
        if from.kind.is_process() && to.kind.has_spare_capacity() {
            debug!(
                process = %from.name,
                resource = %to.name,
                "cycle found but requested resource has spare capacity"
            );
            return None;
        }
    }

    let cycle = DeadlockCycle::from_edges(graph, &cycle);
    debug!(cycle = %cycle, "deadlock confirmed");
    Some(cycle)
}

/// `graph.detect_deadlock()` on the store itself.
pub trait DetectDeadlock {
    fn detect_deadlock(&self) -> Option<DeadlockCycle>;
}

impl DetectDeadlock for ResourceGraph {
    fn detect_deadlock(&self) -> Option<DeadlockCycle> {
        detect_deadlock(self)
    }
}
