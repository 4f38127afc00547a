//! Per-process and per-resource allocation tables.

use std::fmt;

use rag_core::NodeId;
use serde::Serialize;

use crate::graph::{EdgeKind, NodeKind, ResourceGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessStatus {
    /// Has at least one outstanding request.
    Waiting,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceStatus {
    /// At least one instance is held.
    Allocated,
    Free,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessStatus::Waiting => "Waiting",
            ProcessStatus::Running => "Running",
        })
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceStatus::Allocated => "Allocated",
            ResourceStatus::Free => "Free",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRow {
    pub name: String,
    /// Resources holding an allocation edge into this process.
    pub allocated: Vec<String>,
    /// Resources this process has requested.
    pub requested: Vec<String>,
    pub status: ProcessStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRow {
    pub name: String,
    pub allocated: u32,
    pub total: u32,
    pub status: ResourceStatus,
}

impl ResourceRow {
    /// `allocated/total`, as shown in the resource table.
    pub fn usage(&self) -> String {
        format!("{}/{}", self.allocated, self.total)
    }
}

/// Read model behind the tabular summary view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    pub processes: Vec<ProcessRow>,
    pub resources: Vec<ResourceRow>,
}

impl AllocationSummary {
    /// Snapshot the graph. Rows and name lists follow node insertion order.
    pub fn from_graph(graph: &ResourceGraph) -> Self {
        let processes = graph
            .processes()
            .map(|node| {
                let allocated = names_where(graph, graph.predecessors(node.id), |from| {
                    graph.edge_kind(from, node.id) == Some(EdgeKind::Allocation)
                });
                let requested = names_where(graph, graph.successors(node.id), |to| {
                    graph.edge_kind(node.id, to) == Some(EdgeKind::Request)
                });
                let status = if requested.is_empty() {
                    ProcessStatus::Running
                } else {
                    ProcessStatus::Waiting
                };
                ProcessRow {
                    name: node.name.clone(),
                    allocated,
                    requested,
                    status,
                }
            })
            .collect();

        let resources = graph
            .resources()
            .filter_map(|node| match node.kind {
                NodeKind::Resource { total, allocated } => Some(ResourceRow {
                    name: node.name.clone(),
                    allocated,
                    total,
                    status: if allocated > 0 {
                        ResourceStatus::Allocated
                    } else {
                        ResourceStatus::Free
                    },
                }),
                NodeKind::Process => None,
            })
            .collect();

        Self {
            processes,
            resources,
        }
    }

    pub fn process(&self, name: &str) -> Option<&ProcessRow> {
        self.processes.iter().find(|row| row.name == name)
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceRow> {
        self.resources.iter().find(|row| row.name == name)
    }
}

fn names_where(
    graph: &ResourceGraph,
    ids: impl Iterator<Item = NodeId>,
    keep: impl Fn(NodeId) -> bool,
) -> Vec<String> {
    let mut ids: Vec<NodeId> = ids.filter(|&id| keep(id)).collect();
    ids.sort();
    ids.into_iter()
        .filter_map(|id| graph.node_by_id(id).map(|n| n.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capacity;

    #[test]
    fn statuses_follow_edges() {
        let mut g = ResourceGraph::new();
        g.add_process("P1");
        g.add_process("P2");
        g.add_resource("R1", Capacity::new(2).unwrap());
        g.add_resource("R2", Capacity::ONE);
        g.request("P1", "R1");
        g.allocate("P1", "R1");
        g.request("P2", "R1");
        g.request("P2", "R2");

        let summary = AllocationSummary::from_graph(&g);

        let p1 = summary.process("P1").unwrap();
        assert_eq!(p1.allocated, vec!["R1".to_string()]);
        assert!(p1.requested.is_empty());
        assert_eq!(p1.status, ProcessStatus::Running);

        let p2 = summary.process("P2").unwrap();
        assert!(p2.allocated.is_empty());
        assert_eq!(p2.requested, vec!["R1".to_string(), "R2".to_string()]);
        assert_eq!(p2.status, ProcessStatus::Waiting);

        let r1 = summary.resource("R1").unwrap();
        assert_eq!(r1.usage(), "1/2");
        assert_eq!(r1.status, ResourceStatus::Allocated);
        assert_eq!(summary.resource("R2").unwrap().status, ResourceStatus::Free);
    }

    #[test]
    fn empty_graph_has_empty_tables() {
        let summary = AllocationSummary::from_graph(&ResourceGraph::new());
        assert_eq!(summary, AllocationSummary::default());
    }
}
