//! Snapshot store.
//!
//! Holds the latest committed [`Snapshot`] behind a `watch` channel. Readers
//! clone an `Arc` and never block on a refresh; the coordinator replaces
//! the whole snapshot in one send.

use std::sync::Arc;

use abaco_core::Snapshot;
use tokio::sync::watch;
use tracing::debug;

/// The authoritative current snapshot, observable for changes.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    sender: Arc<watch::Sender<Arc<Snapshot>>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates a store holding the empty snapshot.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Snapshot::empty()));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns the latest committed snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.sender.borrow().clone()
    }

    /// Subscribes to published snapshots.
    ///
    /// The receiver starts with the current snapshot marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.sender.subscribe()
    }

    /// Atomically replaces the current snapshot.
    ///
    /// Only the refresh coordinator publishes, and only one cycle runs at a
    /// time, so revisions arrive in order.
    pub(crate) fn publish(&self, snapshot: Snapshot) {
        let revision = snapshot.revision();
        self.sender.send_replace(Arc::new(snapshot));
        debug!(revision, "Snapshot published");
    }
}
