//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML file.

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::render::DEFAULT_SERVER_NAME_TEMPLATE;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Template and output locations, naming templates.
    pub renderer: RendererConfig,

    /// Update coalescing settings.
    pub coordinator: CoordinatorConfig,

    /// Snapshot input.
    pub snapshot: SnapshotConfig,

    /// Load balancer reload notification.
    pub reload: ReloadConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Renderer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Path of the configuration template.
    pub template_path: String,

    /// Path of the rendered configuration.
    pub output_path: String,

    /// Comma-separated list of server name templates.
    pub server_name_templates: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            template_path: "/etc/lb-reloader/haproxy.cfg.hbs".to_string(),
            output_path: "/etc/haproxy/haproxy.cfg".to_string(),
            server_name_templates: DEFAULT_SERVER_NAME_TEMPLATE.to_string(),
        }
    }
}

/// Update coordinator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet time in milliseconds before a pending update runs.
    pub quiescence_ms: u64,
}

impl CoordinatorConfig {
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { quiescence_ms: 1000 }
    }
}

/// Snapshot input configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SnapshotConfig {
    /// JSON snapshot file, watched for changes.
    pub path: Option<String>,
}

/// Reload notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Pidfile of the load balancer process. No notification when unset.
    pub pidfile: Option<String>,

    /// Signal sent to the load balancer (e.g. "SIGHUP", "SIGUSR2").
    pub signal: String,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            pidfile: None,
            signal: "SIGHUP".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines.
    pub json_logs: bool,

    /// Enable the metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
