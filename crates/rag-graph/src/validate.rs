//! Graph invariant checks.
//!
//! Mutations never leave the graph inconsistent; these checks exist so tests
//! and debug builds can prove it.

use std::collections::HashMap;

use rag_core::NodeId;

use crate::error::{GraphError, GraphResult};
use crate::graph::{EdgeKind, NodeKind, ResourceGraph};

/// Verify every structural invariant of the allocation graph.
pub fn check_invariants(graph: &ResourceGraph) -> GraphResult<()> {
    check_name_index(graph)?;

    let mut held: HashMap<NodeId, u32> = HashMap::new();

    for edge in graph.edges() {
        let from = graph.node_by_id(edge.from).ok_or_else(|| {
            invariant(format!("edge source {} is not a registered node", edge.from))
        })?;
        let to = graph.node_by_id(edge.to).ok_or_else(|| {
            invariant(format!("edge target {} is not a registered node", edge.to))
        })?;

        // Edge kind must agree with endpoint kinds
        let well_typed = match edge.kind {
            EdgeKind::Request => from.kind.is_process() && to.kind.is_resource(),
            EdgeKind::Allocation => from.kind.is_resource() && to.kind.is_process(),
        };
        if !well_typed {
            return Err(invariant(format!(
                "{} edge {} -> {} connects the wrong node kinds",
                edge.kind, from.name, to.name
            )));
        }

        // A pair carries a request or an allocation, not both
        if graph.edge_kind(edge.to, edge.from).is_some() {
            return Err(invariant(format!(
                "{} and {} have edges in both directions",
                from.name, to.name
            )));
        }

        if edge.kind == EdgeKind::Allocation {
            *held.entry(edge.from).or_default() += 1;
        }
    }

    for node in graph.resources() {
        let NodeKind::Resource { total, allocated } = node.kind else {
            continue;
        };
        if total == 0 {
            return Err(invariant(format!("resource {} has no instances", node.name)));
        }
        if allocated > total {
            return Err(invariant(format!(
                "resource {} over-allocated ({allocated}/{total})",
                node.name
            )));
        }
        let edges = held.get(&node.id).copied().unwrap_or(0);
        if edges != allocated {
            return Err(invariant(format!(
                "resource {} counts {allocated} allocated but has {edges} allocation edges",
                node.name
            )));
        }
    }

    Ok(())
}

fn check_name_index(graph: &ResourceGraph) -> GraphResult<()> {
    if graph.by_name.len() != graph.nodes.len() {
        return Err(invariant(format!(
            "{} names indexed for {} nodes",
            graph.by_name.len(),
            graph.nodes.len()
        )));
    }
    for (i, node) in graph.nodes.iter().enumerate() {
        if node.id.index() as usize != i {
            return Err(invariant(format!("node {} stored out of order", node.name)));
        }
        if graph.by_name.get(&node.name) != Some(&node.id) {
            return Err(invariant(format!("node {} missing from name index", node.name)));
        }
        if !graph.edges.contains_node(node.id) {
            return Err(invariant(format!("node {} missing from edge map", node.name)));
        }
    }
    Ok(())
}

fn invariant(what: String) -> GraphError {
    GraphError::Invariant { what }
}
