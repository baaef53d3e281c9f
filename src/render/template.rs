//! Template execution against a cluster snapshot.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::Handlebars;
use thiserror::Error;

use crate::render::helpers::register_helpers;
use crate::render::names::ServerNameTemplates;
use crate::topology::ClusterInformation;

/// Errors raised while producing a configuration file.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template source could not be read.
    #[error("failed to read template {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template source is not a valid template.
    #[error("failed to parse template {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// A helper or an expression failed during rendering.
    #[error("failed to render template {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// The target path could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something able to turn a snapshot into a configuration artifact.
pub trait Template: Send + Sync {
    fn execute(&self, info: &ClusterInformation) -> Result<(), RenderError>;
}

/// Renders the template at `source` into the file at `path`.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    source: PathBuf,
    path: PathBuf,
    names: Arc<ServerNameTemplates>,
}

impl TemplateFile {
    pub fn new(
        source: impl AsRef<Path>,
        path: impl AsRef<Path>,
        names: Arc<ServerNameTemplates>,
    ) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            path: path.as_ref().to_path_buf(),
            names,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the snapshot to a string without touching the target.
    pub fn render(&self, info: &ClusterInformation) -> Result<String, RenderError> {
        let content = fs::read_to_string(&self.source).map_err(|source| RenderError::Source {
            path: self.source.clone(),
            source,
        })?;

        // Registered under the base name of the source path.
        let name = self
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());

        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        register_helpers(&mut registry, self.names.clone());

        registry
            .register_template_string(&name, content)
            .map_err(|e| RenderError::Parse {
                path: self.source.clone(),
                source: Box::new(e),
            })?;

        registry.render(&name, info).map_err(|e| RenderError::Render {
            path: self.source.clone(),
            source: Box::new(e),
        })
    }

    /// Replace the target with `contents`.
    ///
    /// Writes a temporary file next to the target and renames it into place,
    /// so readers see either the old or the new file.
    fn write(&self, contents: &[u8]) -> Result<(), RenderError> {
        let write_err = |source| RenderError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".lb-reloader")
            .tempfile_in(dir)
            .map_err(write_err)?;
        tmp.write_all(contents).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(write_err)?;
        }

        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl Template for TemplateFile {
    fn execute(&self, info: &ClusterInformation) -> Result<(), RenderError> {
        let rendered = self.render(info)?;
        self.write(rendered.as_bytes())?;

        tracing::info!(
            source = %self.source.display(),
            path = %self.path.display(),
            bytes = rendered.len(),
            services = info.services.len(),
            "Configuration rendered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{PortSpec, ServiceInformation};

    fn names() -> Arc<ServerNameTemplates> {
        Arc::new(ServerNameTemplates::parse("").unwrap())
    }

    fn snapshot() -> ClusterInformation {
        ClusterInformation {
            services: vec![ServiceInformation {
                name: "web".into(),
                namespace: "prod".into(),
                port: PortSpec::new("10.0.0.1".parse().unwrap(), 80, "tcp", "http"),
                endpoints: vec![],
                node_port: 30080,
                external: vec![],
                timeout: 0,
            }],
            ports: vec![PortSpec::new("10.0.0.1".parse().unwrap(), 80, "tcp", "http")],
            nodes: vec!["node-a.example.org".into()],
            domain: "cluster.local".into(),
        }
    }

    #[test]
    fn test_execute_writes_target() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("haproxy.cfg.hbs");
        let target = dir.path().join("haproxy.cfg");
        fs::write(
            &source,
            "{{#each Ports}}frontend {{Label this}}\n{{/each}}{{#each Nodes}}server {{EscapeNode this}}\n{{/each}}",
        )
        .unwrap();

        TemplateFile::new(&source, &target, names())
            .execute(&snapshot())
            .unwrap();

        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "frontend 0a000001_80_tcp_http\nserver node-a_example_org\n"
        );
    }

    #[test]
    fn test_execute_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("t.hbs");
        let target = dir.path().join("out.cfg");
        fs::write(&source, "domain {{Domain}}").unwrap();
        fs::write(&target, "a much longer previous configuration file").unwrap();

        TemplateFile::new(&source, &target, names())
            .execute(&snapshot())
            .unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "domain cluster.local");
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let tpl = TemplateFile::new(dir.path().join("absent"), dir.path().join("out"), names());
        assert!(matches!(tpl.execute(&snapshot()), Err(RenderError::Source { .. })));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("t.hbs");
        fs::write(&source, "{{#each Ports}}unclosed").unwrap();
        let tpl = TemplateFile::new(&source, dir.path().join("out"), names());
        assert!(matches!(tpl.execute(&snapshot()), Err(RenderError::Parse { .. })));
    }

    #[test]
    fn test_render_error_keeps_previous_target() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("t.hbs");
        let target = dir.path().join("out.cfg");
        fs::write(&source, "{{Domain}} {{Undefined.Field}}").unwrap();
        fs::write(&target, "previous").unwrap();

        let result = TemplateFile::new(&source, &target, names()).execute(&snapshot());

        assert!(matches!(result, Err(RenderError::Render { .. })));
        assert_eq!(fs::read_to_string(&target).unwrap(), "previous");
    }

    #[test]
    fn test_unwritable_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("t.hbs");
        fs::write(&source, "{{Domain}}").unwrap();
        let target = dir.path().join("missing-dir").join("out.cfg");

        let result = TemplateFile::new(&source, &target, names()).execute(&snapshot());
        assert!(matches!(result, Err(RenderError::Write { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_target_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("t.hbs");
        let target = dir.path().join("out.cfg");
        fs::write(&source, "{{Domain}}").unwrap();

        TemplateFile::new(&source, &target, names())
            .execute(&snapshot())
            .unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
