//! Human-readable account of a confirmed deadlock.

use std::fmt;

use rag_graph::EdgeKind;
use serde::Serialize;

use crate::analyzer::DeadlockCycle;

/// One fact read off a cycle edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum Fact {
    WaitingFor { process: String, resource: String },
    HeldBy { resource: String, process: String },
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::WaitingFor { process, resource } => {
                write!(f, "{process} is waiting for {resource}")
            }
            Fact::HeldBy { resource, process } => write!(f, "{resource} is held by {process}"),
        }
    }
}

/// Releasing this allocation would break the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseAction {
    pub resource: String,
    pub process: String,
}

impl fmt::Display for ReleaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Release {} from {}", self.resource, self.process)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    /// One fact per cycle edge, in cycle order.
    pub facts: Vec<Fact>,
    /// One candidate per allocation edge of the cycle.
    pub release_candidates: Vec<ReleaseAction>,
}

/// Derive the waiting/held facts and release suggestions for a cycle.
pub fn explain(cycle: &DeadlockCycle) -> Explanation {
    let mut facts = Vec::with_capacity(cycle.len());
    let mut release_candidates = Vec::new();

    for edge in cycle.edges() {
        match edge.kind {
            EdgeKind::Request => facts.push(Fact::WaitingFor {
                process: edge.from.clone(),
                resource: edge.to.clone(),
            }),
            EdgeKind::Allocation => {
                facts.push(Fact::HeldBy {
                    resource: edge.from.clone(),
                    process: edge.to.clone(),
                });
                release_candidates.push(ReleaseAction {
                    resource: edge.from.clone(),
                    process: edge.to.clone(),
                });
            }
        }
    }

    Explanation {
        facts,
        release_candidates,
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deadlock explanation:")?;
        for fact in &self.facts {
            writeln!(f, "  • {fact}")?;
        }
        writeln!(f)?;
        writeln!(f, "Suggested action:")?;
        writeln!(
            f,
            "  Consider releasing one of the following resource allocations:"
        )?;
        for action in &self.release_candidates {
            writeln!(f, "  → {action}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DetectDeadlock;
    use rag_graph::{Capacity, ResourceGraph};

    #[test]
    fn facts_mirror_cycle_edges() {
        let mut g = ResourceGraph::new();
        g.add_process("P1");
        g.add_process("P2");
        g.add_resource("R1", Capacity::ONE);
        g.add_resource("R2", Capacity::ONE);
        for (p, r) in [("P1", "R1"), ("P2", "R2")] {
            g.request(p, r);
            g.allocate(p, r);
        }
        g.request("P1", "R2");
        g.request("P2", "R1");

        let cycle = g.detect_deadlock().unwrap();
        let explanation = explain(&cycle);

        assert_eq!(explanation.facts.len(), 4);
        assert!(explanation.facts.contains(&Fact::WaitingFor {
            process: "P1".into(),
            resource: "R2".into()
        }));
        assert!(explanation.facts.contains(&Fact::HeldBy {
            resource: "R1".into(),
            process: "P1".into()
        }));

        let mut releases: Vec<String> = explanation
            .release_candidates
            .iter()
            .map(ToString::to_string)
            .collect();
        releases.sort();
        assert_eq!(releases, vec!["Release R1 from P1", "Release R2 from P2"]);

        let text = explanation.to_string();
        assert!(text.contains("P2 is waiting for R1"));
        assert!(text.contains("→ Release R2 from P2"));
    }
}
