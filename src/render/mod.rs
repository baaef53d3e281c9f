//! Configuration rendering subsystem.
//!
//! # Data Flow
//! ```text
//! ClusterInformation snapshot
//!     → template.rs (load user template, bind helpers)
//!     → helpers.rs (EscapeNode, IntRange, ServerNames, ...)
//!     → names.rs (server names per service)
//!     → rendered text
//!     → temporary file + rename over the target path
//! ```
//!
//! # Design Decisions
//! - The user template is re-read on every render, so edits apply on the next update
//! - Strict mode: undefined fields are render errors, not empty strings
//! - Output is plain text, no HTML escaping
//! - The target is only replaced after a complete render

pub mod helpers;
pub mod names;
pub mod template;

pub use names::{NameTemplateError, ServerName, ServerNameTemplates, DEFAULT_SERVER_NAME_TEMPLATE};
pub use template::{RenderError, Template, TemplateFile};
