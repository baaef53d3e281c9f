//! Server name generation.
//!
//! # Responsibilities
//! - Parse the configured naming templates once, at startup
//! - Expand them for a service and domain
//! - Append the service's external aliases
//!
//! # Design Decisions
//! - Templates live in an immutable object shared by `Arc`, no global state
//! - Generated names are deduplicated; aliases are appended untouched
//! - A leading `~` marks a pattern rather than a literal name

use std::collections::HashSet;
use std::fmt;

use handlebars::Handlebars;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

use crate::topology::ServiceInformation;

/// Naming template used when none is configured.
pub const DEFAULT_SERVER_NAME_TEMPLATE: &str =
    "{{Service.Name}}.{{Service.Namespace}}.svc.{{Domain}}";

const PATTERN_MARKER: char = '~';

/// A naming template failed to parse.
#[derive(Debug, Error)]
#[error("invalid server name template #{index} `{template}`: {source}")]
pub struct NameTemplateError {
    pub index: usize,
    pub template: String,
    #[source]
    pub source: Box<handlebars::TemplateError>,
}

/// A server name bound to a service, either literal or a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerName(String);

impl ServerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// True when the name is a pattern (leading `~`).
    pub fn is_regexp(&self) -> bool {
        self.0.starts_with(PATTERN_MARKER)
    }

    /// The name with the pattern marker stripped.
    pub fn regexp(&self) -> &str {
        self.0.strip_prefix(PATTERN_MARKER).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Templates see `{Name, IsRegexp, Regexp}`.
impl Serialize for ServerName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ServerName", 3)?;
        state.serialize_field("Name", &self.0)?;
        state.serialize_field("IsRegexp", &self.is_regexp())?;
        state.serialize_field("Regexp", self.regexp())?;
        state.end()
    }
}

#[derive(serde::Serialize)]
struct NameContext<'a> {
    #[serde(rename = "Service")]
    service: &'a ServiceInformation,
    #[serde(rename = "Domain")]
    domain: &'a str,
}

/// The parsed naming templates.
pub struct ServerNameTemplates {
    registry: Handlebars<'static>,
    names: Vec<String>,
}

impl ServerNameTemplates {
    /// Parse a comma-separated list of naming templates.
    ///
    /// An empty list selects [`DEFAULT_SERVER_NAME_TEMPLATE`].
    pub fn parse(templates: &str) -> Result<Self, NameTemplateError> {
        let templates = if templates.trim().is_empty() {
            DEFAULT_SERVER_NAME_TEMPLATE
        } else {
            templates
        };

        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        let mut names = Vec::new();
        for (index, template) in templates.split(',').enumerate() {
            let name = format!("server_name_{}", index);
            registry
                .register_template_string(&name, template)
                .map_err(|e| NameTemplateError {
                    index,
                    template: template.to_string(),
                    source: Box::new(e),
                })?;
            names.push(name);
        }

        tracing::debug!(count = names.len(), "Server name templates parsed");
        Ok(Self { registry, names })
    }

    /// Number of configured templates.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Server names for a service: generated names first, deduplicated,
    /// followed by every external alias in order.
    pub fn generate(
        &self,
        service: &ServiceInformation,
        domain: &str,
    ) -> Result<Vec<ServerName>, handlebars::RenderError> {
        let context = NameContext { service, domain };

        let mut generated = Vec::with_capacity(self.names.len());
        for name in &self.names {
            generated.push(self.registry.render(name, &context)?);
        }

        let names = remove_duplicated(generated)
            .into_iter()
            .chain(service.external.iter().cloned())
            .map(ServerName::new)
            .collect();
        Ok(names)
    }
}

impl fmt::Debug for ServerNameTemplates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerNameTemplates")
            .field("count", &self.names.len())
            .finish()
    }
}

/// Set semantics; the first occurrence of each name is kept in place.
pub(crate) fn remove_duplicated(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
