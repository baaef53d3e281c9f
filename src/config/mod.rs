//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! At runtime:
//!     watcher.rs detects snapshot/template changes
//!     → new snapshot published
//!     → update coordinator signalled
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, CoordinatorConfig, ObservabilityConfig, ReloadConfig, RendererConfig,
    SnapshotConfig,
};
pub use validation::{validate_config, ValidationError};
