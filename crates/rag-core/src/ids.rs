use core::fmt;
use core::num::NonZeroU32;

/// Identifier of a process or resource node, assigned in registration order.
///
/// Ids are never reused until the graph is reset, so an edge or a reported
/// cycle keeps naming the same node. `Option<Id>` stays four bytes, and
/// `Copy + Ord + Hash` lets the id key a `petgraph` graph map directly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Id of the node registered at position `index` of the node list.
    pub fn from_index(index: u32) -> Self {
        // Stored offset by one; a graph cannot hold u32::MAX nodes.
        Self(NonZeroU32::new(index + 1).expect("node index overflow"))
    }

    /// Position of the node in registration order.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

/// Processes and resources share one identifier namespace.
pub type NodeId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_keeps_registration_position() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn optional_node_id_costs_nothing() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }

    #[test]
    fn ids_order_by_index() {
        assert!(Id::from_index(1) < Id::from_index(2));
        assert_eq!(Id::from_index(7).to_string(), "#7");
    }
}
