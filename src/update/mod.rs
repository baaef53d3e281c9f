//! Update coordination subsystem.
//!
//! # Data Flow
//! ```text
//! watcher / SIGHUP / snapshot publish
//!     → UpdateHandle::signal (state := Pending, wake timer loop)
//!     → quiescence loop (timer resets on each wake-up)
//!     → quiet for one window: Pending → Firing, fire event
//!     → Updater::run (Firing → Idle, await update function)
//! ```
//!
//! # Design Decisions
//! - Trailing-edge debounce with no maximum latency
//! - The update function never runs concurrently with itself
//! - Signals during an update re-arm a new window, never lost

pub mod coordinator;

pub use coordinator::{UpdateHandle, UpdateState, Updater, DEFAULT_QUIESCENCE};
