//! Periodic deadlock scanning on a background thread.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rag_detect::{DeadlockMonitor, DeadlockNotice};
use rag_graph::SharedGraph;
use tracing::{debug, error};

use crate::error::AppResult;

/// Background scanner over a [`SharedGraph`].
///
/// Scans immediately, then once per interval, each time under the graph lock.
/// `on_notice` runs once per deadlock episode. Dropping the poller stops the
/// thread and waits for it.
#[derive(Debug)]
pub struct Poller {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn spawn<F>(shared: SharedGraph, interval: Duration, mut on_notice: F) -> AppResult<Self>
    where
        F: FnMut(DeadlockNotice) + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("rag-poller".to_string())
            .spawn(move || {
                let mut monitor = DeadlockMonitor::new();
                loop {
                    match monitor.poll(&shared) {
                        Ok(Some(notice)) => on_notice(notice),
                        Ok(None) => {}
                        Err(err) => {
                            error!(%err, "deadlock poll failed, stopping poller");
                            break;
                        }
                    }
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("poller stopped");
            })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stop scanning and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The thread may already have exited on a poll error.
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_graph::{Capacity, ResourceGraph};

    #[test]
    fn notifies_once_per_episode() {
        let shared = SharedGraph::default();
        shared
            .with(|g| {
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
            })
            .unwrap();

        let (tx, rx) = mpsc::channel();
        let poller = Poller::spawn(shared.clone(), Duration::from_millis(5), move |notice| {
            let _ = tx.send(notice.episode);
        })
        .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        thread::sleep(Duration::from_millis(100));
        assert!(rx.try_recv().is_err());

        shared.with(|g| g.release("P1", "R1")).unwrap();
        thread::sleep(Duration::from_millis(200));
        shared
            .with(|g| {
                g.request("P1", "R1");
                g.allocate("P1", "R1")
            })
            .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
        poller.stop();
    }

    #[test]
    fn drop_stops_thread() {
        let shared = SharedGraph::new(ResourceGraph::new());
        let poller = Poller::spawn(shared, Duration::from_secs(60), |_| {}).unwrap();
        drop(poller);
    }
}
