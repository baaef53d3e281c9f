//! Cluster topology subsystem.
//!
//! # Data Flow
//! ```text
//! external watcher / snapshot file (source.rs)
//!     → ClusterInformation (model.rs, immutable)
//!     → SnapshotStore::publish (store.rs, atomic swap)
//!     → update function loads the latest snapshot
//!     → renderer (labels from label.rs)
//! ```
//!
//! # Design Decisions
//! - Snapshots are never mutated; a change produces a wholly new value
//! - Snapshots are shared as `Arc<ClusterInformation>`, read-only
//! - Labels are pure functions of the value, stable across restarts

pub mod label;
pub mod model;
pub mod source;
pub mod store;

pub use model::{ClusterInformation, PortSpec, ServiceEndpoint, ServiceInformation};
pub use source::{FileSnapshotSource, SnapshotError, SnapshotSource};
pub use store::SnapshotStore;
