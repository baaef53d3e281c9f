//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Parse naming templates → Load initial snapshot → Start coordinator
//!     → Start file watcher → Initial render
//!
//! Signals (signals.rs):
//!     SIGHUP → Schedule a re-render
//!     SIGTERM/SIGINT → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No draining on exit; the process is supervised and restarted as a unit

pub mod signals;
pub mod startup;
