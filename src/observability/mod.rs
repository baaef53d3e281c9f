//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields over formatted messages
//! - Metrics are cheap counters; without an installed recorder they are no-ops
//! - `RUST_LOG` overrides the configured log level

pub mod logging;
pub mod metrics;
