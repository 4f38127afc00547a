//! Directed cycle search over request and allocation edges.

use std::collections::HashMap;

use petgraph::visit::{Control, DfsEvent, depth_first_search};
use rag_core::NodeId;
use rag_graph::{Edge, ResourceGraph};

/// Find one simple cycle, following edge direction.
///
/// Depth-first search starting from each node in insertion order. The first
/// back edge closes the cycle, which is returned as its ordered edges
/// starting at the node the back edge points to. Runs in O(V + E).
pub fn find_cycle(graph: &ResourceGraph) -> Option<Vec<Edge>> {
    let mut parent: HashMap<NodeId, NodeId> = HashMap::with_capacity(graph.node_count());
    let starts = graph.nodes().iter().map(|n| n.id);

    let back_edge = depth_first_search(graph.edge_map(), starts, |event| match event {
        DfsEvent::TreeEdge(from, to) => {
            parent.insert(to, from);
            Control::Continue
        }
        DfsEvent::BackEdge(from, to) => Control::Break((from, to)),
        _ => Control::Continue,
    });
    let (tail, head) = back_edge.break_value()?;

    // The back edge target is an ancestor of its source in the DFS tree.
    let mut path = vec![tail];
    let mut at = tail;
    while at != head {
        at = *parent.get(&at)?;
        path.push(at);
    }
    path.reverse();

    path.iter()
        .zip(path.iter().skip(1).chain(std::iter::once(&head)))
        .map(|(&from, &to)| {
            graph
                .edge_kind(from, to)
                .map(|kind| Edge { from, to, kind })
        })
        .collect()
}
