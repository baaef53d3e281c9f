//! Latest-snapshot store shared between the watcher and the update function.

use std::sync::Arc;
use arc_swap::ArcSwap;

use crate::topology::model::ClusterInformation;

/// Holds the most recently published snapshot.
///
/// Publishing replaces the whole snapshot; readers never observe a partially
/// updated value.
#[derive(Debug)]
pub struct SnapshotStore {
    current: ArcSwap<ClusterInformation>,
}

impl SnapshotStore {
    pub fn new(initial: ClusterInformation) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: ClusterInformation) {
        tracing::debug!(
            services = snapshot.services.len(),
            ports = snapshot.ports.len(),
            nodes = snapshot.nodes.len(),
            "Snapshot published"
        );
        self.current.store(Arc::new(snapshot));
    }

    /// The latest snapshot.
    pub fn load(&self) -> Arc<ClusterInformation> {
        self.current.load_full()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(ClusterInformation::default())
    }
}
