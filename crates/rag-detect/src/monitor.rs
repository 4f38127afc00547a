//! Repeated scanning with one notice per deadlock episode.

use rag_core::RagResult;
use rag_graph::{ResourceGraph, SharedGraph};
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzer::{DeadlockCycle, detect_deadlock};
use crate::explain::{Explanation, explain};

/// Whether the current deadlock has already been announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Quiescent,
    DeadlockReported,
}

/// Emitted once when a scan first confirms a deadlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlockNotice {
    /// 1-based count of episodes seen by this monitor.
    pub episode: u64,
    pub cycle: DeadlockCycle,
    pub explanation: Explanation,
}

/// Deduplicates deadlock reports across consecutive scans.
///
/// A notice is produced on the transition from `Quiescent` to
/// `DeadlockReported`. The state only returns to `Quiescent` when a scan
/// finds no deadlock, so an unchanged deadlock is reported once.
#[derive(Debug, Clone, Default)]
pub struct DeadlockMonitor {
    state: MonitorState,
    episodes: u64,
}

impl DeadlockMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Number of episodes reported so far.
    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    /// Feed the result of one scan.
    pub fn observe(&mut self, scan: Option<&DeadlockCycle>) -> Option<DeadlockNotice> {
        match (self.state, scan) {
            (MonitorState::DeadlockReported, None) => {
                info!("deadlock cleared");
                self.state = MonitorState::Quiescent;
                None
            }
            (MonitorState::Quiescent, None) | (MonitorState::DeadlockReported, Some(_)) => None,
            (MonitorState::Quiescent, Some(cycle)) => {
                self.state = MonitorState::DeadlockReported;
                self.episodes += 1;
                warn!(episode = self.episodes, cycle = %cycle, "deadlock detected");
                Some(DeadlockNotice {
                    episode: self.episodes,
                    cycle: cycle.clone(),
                    explanation: explain(cycle),
                })
            }
        }
    }

    /// Scan `graph` and feed the result.
    pub fn scan(&mut self, graph: &ResourceGraph) -> Option<DeadlockNotice> {
        let found = detect_deadlock(graph);
        self.observe(found.as_ref())
    }

    /// Scan a shared graph while holding its lock.
    pub fn poll(&mut self, shared: &SharedGraph) -> RagResult<Option<DeadlockNotice>> {
        let graph = shared.lock()?;
        Ok(self.scan(&graph))
    }

    /// Forget any reported episode, e.g. after the graph was reset.
    pub fn reset(&mut self) {
        self.state = MonitorState::Quiescent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_graph::Capacity;

    fn deadlocked() -> ResourceGraph {
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
        g
    }

    #[test]
    fn reports_each_episode_once() {
        let mut g = deadlocked();
        let mut monitor = DeadlockMonitor::new();

        let notice = monitor.scan(&g).unwrap();
        assert_eq!(notice.episode, 1);
        assert_eq!(monitor.state(), MonitorState::DeadlockReported);

        // Nothing changed: stay quiet.
        assert!(monitor.scan(&g).is_none());
        assert!(monitor.scan(&g).is_none());

        // Breaking the cycle clears the flag.
        assert!(g.release("P1", "R1"));
        assert!(monitor.scan(&g).is_none());
        assert_eq!(monitor.state(), MonitorState::Quiescent);

        // Re-entering the deadlock is a new episode.
        g.request("P1", "R1");
        assert!(g.allocate("P1", "R1"));
        // P1 now holds R1 again but its old request for R2 remains, and P2 waits on R1.
        let notice = monitor.scan(&g).unwrap();
        assert_eq!(notice.episode, 2);
        assert_eq!(monitor.episodes(), 2);
    }

    #[test]
    fn quiet_graph_never_notifies() {
        let mut monitor = DeadlockMonitor::new();
        assert!(monitor.scan(&ResourceGraph::new()).is_none());
        assert_eq!(monitor.state(), MonitorState::Quiescent);
        assert_eq!(monitor.episodes(), 0);
    }

    #[test]
    fn poll_uses_shared_graph() {
        let shared = SharedGraph::new(deadlocked());
        let mut monitor = DeadlockMonitor::new();
        assert!(monitor.poll(&shared).unwrap().is_some());
        assert!(monitor.poll(&shared).unwrap().is_none());

        monitor.reset();
        assert_eq!(monitor.state(), MonitorState::Quiescent);
        assert!(monitor.poll(&shared).unwrap().is_some());
    }
}
