//! Core graph data structures and the mutation operations.

use std::collections::HashMap;
use std::fmt;

use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;
use rag_core::NodeId;
use serde::Serialize;
use tracing::debug;

use crate::capacity::Capacity;
use crate::error::{GraphError, GraphResult};

/// Kind of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Process → resource: the process waits for one unit.
    Request,
    /// Resource → process: one unit is held by the process.
    Allocation,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Request => "request",
            EdgeKind::Allocation => "allocation",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a node is, together with the attributes that only that kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Process,
    Resource { total: u32, allocated: u32 },
}

impl NodeKind {
    pub fn is_process(&self) -> bool {
        matches!(self, NodeKind::Process)
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, NodeKind::Resource { .. })
    }

    /// True for a resource with at least one unallocated instance.
    pub fn has_spare_capacity(&self) -> bool {
        match *self {
            NodeKind::Resource { total, allocated } => allocated < total,
            NodeKind::Process => false,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            NodeKind::Process => "process",
            NodeKind::Resource { .. } => "resource",
        }
    }
}

/// A process or resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
}

/// A typed edge, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
}

/// The resource allocation graph.
///
/// Nodes live in a vector indexed by their ID, so enumeration follows
/// insertion order. Edges live in a `petgraph` graph map keyed by the same
/// IDs; at most one edge exists per ordered pair, and a process/resource pair
/// carries either a request or an allocation, never both.
///
/// Every mutation checks its precondition first and leaves the graph
/// untouched when it does not hold.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) by_name: HashMap<String, NodeId>,
    pub(crate) edges: DiGraphMap<NodeId, EdgeKind>,
}

impl ResourceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a process. Returns false if the name is already taken.
    pub fn add_process(&mut self, name: impl Into<String>) -> bool {
        self.try_add_process(name).is_ok()
    }

    /// Register a resource with `capacity` instances, none allocated.
    /// Returns false if the name is already taken.
    pub fn add_resource(&mut self, name: impl Into<String>, capacity: Capacity) -> bool {
        self.try_add_resource(name, capacity).is_ok()
    }

    pub fn try_add_process(&mut self, name: impl Into<String>) -> GraphResult<NodeId> {
        self.insert_node(name.into(), NodeKind::Process)
    }

    pub fn try_add_resource(
        &mut self,
        name: impl Into<String>,
        capacity: Capacity,
    ) -> GraphResult<NodeId> {
        self.insert_node(
            name.into(),
            NodeKind::Resource {
                total: capacity.get(),
                allocated: 0,
            },
        )
    }

    fn insert_node(&mut self, name: String, kind: NodeKind) -> GraphResult<NodeId> {
        if self.by_name.contains_key(&name) {
            debug!(node = %name, "add rejected: name already exists");
            return Err(GraphError::DuplicateName { name });
        }
        let index = u32::try_from(self.nodes.len())
            .ok()
            .filter(|&i| i < u32::MAX)
            .ok_or_else(|| GraphError::Invariant {
                what: "node count exceeds identifier range".to_string(),
            })?;

        let id = NodeId::from_index(index);
        self.edges.add_node(id);
        self.by_name.insert(name.clone(), id);
        debug!(node = %name, kind = kind.label(), "node added");
        self.nodes.push(Node { id, name, kind });
        Ok(id)
    }

    /// Record that `process` waits for one unit of `resource`.
    ///
    /// Idempotent: does nothing when either name is unknown or of the wrong
    /// kind, when the request already exists, or when the process already
    /// holds a unit of the resource.
    pub fn request(&mut self, process: &str, resource: &str) {
        let Some((p, r)) = self.process_resource_pair(process, resource) else {
            debug!(process, resource, "request ignored: operands missing");
            return;
        };
        if self.edges.contains_edge(p, r) || self.edges.contains_edge(r, p) {
            debug!(process, resource, "request ignored: edge already present");
            return;
        }
        self.edges.add_edge(p, r, EdgeKind::Request);
        debug!(process, resource, "request edge added");
    }

    /// Grant a pending request. Returns false if there is no request edge or
    /// the resource has no spare instance; the request is left in place.
    pub fn allocate(&mut self, process: &str, resource: &str) -> bool {
        self.try_allocate(process, resource).is_ok()
    }

    /// Like [`ResourceGraph::allocate`], but says why admission failed.
    pub fn try_allocate(&mut self, process: &str, resource: &str) -> GraphResult<()> {
        let p = self.require(process)?;
        let r = self.require(resource)?;
        if self.edges.edge_weight(p, r) != Some(&EdgeKind::Request) {
            return Err(GraphError::NoPendingRequest {
                process: process.to_string(),
                resource: resource.to_string(),
            });
        }

        {
            let node = self.node_mut(r)?;
            let NodeKind::Resource { total, allocated } = &mut node.kind else {
                return Err(GraphError::WrongKind {
                    name: resource.to_string(),
                    expected: "resource",
                });
            };
            if *allocated >= *total {
                debug!(process, resource, "allocation refused: capacity exhausted");
                return Err(GraphError::CapacityExhausted {
                    resource: resource.to_string(),
                    allocated: *allocated,
                    total: *total,
                });
            }
            *allocated += 1;
        }

        self.edges.remove_edge(p, r);
        self.edges.add_edge(r, p, EdgeKind::Allocation);
        debug!(process, resource, "request converted to allocation");
        Ok(())
    }

    /// Give back the unit of `resource` held by `process`.
    ///
    /// Returns false, changing nothing, when no such allocation exists.
    pub fn release(&mut self, process: &str, resource: &str) -> bool {
        let Some((p, r)) = self.process_resource_pair(process, resource) else {
            return false;
        };
        if self.edges.edge_weight(r, p) != Some(&EdgeKind::Allocation) {
            debug!(process, resource, "release ignored: nothing held");
            return false;
        }
        self.edges.remove_edge(r, p);
        if let Some(Node {
            kind: NodeKind::Resource { allocated, .. },
            ..
        }) = self.nodes.get_mut(r.index() as usize)
        {
            *allocated = allocated.saturating_sub(1);
        }
        debug!(process, resource, "allocation released");
        true
    }

    /// Discard every node and edge.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.by_name.clear();
        self.edges.clear();
        debug!("graph reset");
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.by_name.get(name).and_then(|&id| self.node_by_id(id))
    }

    /// Look up a node by ID.
    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index() as usize)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn processes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.kind.is_process())
    }

    pub fn resources(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.kind.is_resource())
    }

    /// `(allocated, total)` for a resource.
    pub fn resource_usage(&self, name: &str) -> Option<(u32, u32)> {
        match self.node(name)?.kind {
            NodeKind::Resource { total, allocated } => Some((allocated, total)),
            NodeKind::Process => None,
        }
    }

    pub fn has_request(&self, process: &str, resource: &str) -> bool {
        self.edge_between(process, resource) == Some(EdgeKind::Request)
    }

    pub fn has_allocation(&self, process: &str, resource: &str) -> bool {
        self.edge_between(resource, process) == Some(EdgeKind::Allocation)
    }

    /// Kind of the edge `from → to`, by node name.
    pub fn edge_between(&self, from: &str, to: &str) -> Option<EdgeKind> {
        let a = *self.by_name.get(from)?;
        let b = *self.by_name.get(to)?;
        self.edge_kind(a, b)
    }

    pub fn edge_kind(&self, from: NodeId, to: NodeId) -> Option<EdgeKind> {
        self.edges.edge_weight(from, to).copied()
    }

    /// All edges currently present.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges
            .all_edges()
            .map(|(from, to, &kind)| Edge { from, to, kind })
    }

    /// Underlying edge map, for `petgraph` traversals.
    pub fn edge_map(&self) -> &DiGraphMap<NodeId, EdgeKind> {
        &self.edges
    }

    /// Targets of the out-edges of `id`.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.neighbors_directed(id, Direction::Outgoing)
    }

    /// Sources of the in-edges of `id`.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.neighbors_directed(id, Direction::Incoming)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn require(&self, name: &str) -> GraphResult<NodeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode {
                name: name.to_string(),
            })
    }

    fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes
            .get_mut(id.index() as usize)
            .ok_or_else(|| GraphError::Invariant {
                what: format!("node {id} missing from node table"),
            })
    }

    /// IDs of a (process, resource) pair, if both exist with the right kinds.
    fn process_resource_pair(&self, process: &str, resource: &str) -> Option<(NodeId, NodeId)> {
        let p = self.node(process)?;
        let r = self.node(resource)?;
        (p.kind.is_process() && r.kind.is_resource()).then_some((p.id, r.id))
    }
}
