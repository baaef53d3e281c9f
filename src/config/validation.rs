//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that naming templates parse
//! - Validate value ranges and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::render::ServerNameTemplates;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.renderer.template_path.trim().is_empty() {
        errors.push(ValidationError::new("renderer.template_path", "must not be empty"));
    }
    if config.renderer.output_path.trim().is_empty() {
        errors.push(ValidationError::new("renderer.output_path", "must not be empty"));
    }
    if let Err(e) = ServerNameTemplates::parse(&config.renderer.server_name_templates) {
        errors.push(ValidationError::new(
            "renderer.server_name_templates",
            e.to_string(),
        ));
    }

    if config.coordinator.quiescence_ms == 0 {
        errors.push(ValidationError::new("coordinator.quiescence_ms", "must be greater than 0"));
    }

    if let Some(path) = &config.snapshot.path {
        if path.trim().is_empty() {
            errors.push(ValidationError::new("snapshot.path", "must not be empty when set"));
        }
    }

    // The signal is only sent when a pidfile names a process.
    if config.reload.pidfile.is_some() {
        if let Err(e) = crate::reload::parse_signal(&config.reload.signal) {
            errors.push(ValidationError::new("reload.signal", e.to_string()));
        }
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level `{}`", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid address `{}`", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
