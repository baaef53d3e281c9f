//! Load balancer configuration renderer and reload coordinator.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod render;
pub mod topology;
pub mod update;

pub use config::AppConfig;
pub use render::{ServerName, ServerNameTemplates, Template, TemplateFile};
pub use topology::{ClusterInformation, PortSpec, ServiceEndpoint, ServiceInformation, SnapshotStore};
pub use update::{UpdateHandle, Updater};
