//! Mutex-guarded graph for callers on more than one thread.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{GraphError, GraphResult};
use crate::graph::ResourceGraph;

/// A [`ResourceGraph`] behind a single lock.
///
/// Mutations and deadlock scans both take the same lock, so a scan always
/// sees a graph that no allocate or release is halfway through.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<Mutex<ResourceGraph>>,
}

impl SharedGraph {
    pub fn new(graph: ResourceGraph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Acquire the lock.
    pub fn lock(&self) -> GraphResult<MutexGuard<'_, ResourceGraph>> {
        self.inner.lock().map_err(|_| GraphError::Poisoned)
    }

    /// Run `f` with exclusive access to the graph.
    pub fn with<T>(&self, f: impl FnOnce(&mut ResourceGraph) -> T) -> GraphResult<T> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}

impl From<ResourceGraph> for SharedGraph {
    fn from(graph: ResourceGraph) -> Self {
        Self::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capacity;
    use std::thread;

    #[test]
    fn clones_share_one_graph() {
        let shared = SharedGraph::default();
        let other = shared.clone();
        other
            .with(|g| g.add_resource("R1", Capacity::new(4).unwrap()))
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared
                        .with(|g| {
                            let name = format!("P{i}");
                            g.add_process(name.clone());
                            g.request(&name, "R1");
                            g.allocate(&name, "R1")
                        })
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        assert_eq!(shared.lock().unwrap().resource_usage("R1"), Some((4, 4)));
    }
}
