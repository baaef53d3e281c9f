//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the renderer, snapshot store and reload notifier from config
//! - Start the update coordinator and the file watcher
//! - Run until a shutdown signal arrives

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{AppConfig, ReloadConfig};
use crate::config::watcher::ChangeWatcher;
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::reload::{NoopNotifier, ReloadError, ReloadNotifier};
use crate::render::{NameTemplateError, RenderError, ServerNameTemplates, Template, TemplateFile};
use crate::topology::{FileSnapshotSource, SnapshotError, SnapshotSource, SnapshotStore};
use crate::update::Updater;

/// Errors that prevent the process from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    NameTemplate(#[from] NameTemplateError),

    #[error(transparent)]
    Reload(#[from] ReloadError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to watch files: {0}")]
    Watch(#[from] notify::Error),
}

/// Notifier for the configured pidfile, or a no-op without one.
pub fn build_notifier(config: &ReloadConfig) -> Result<Arc<dyn ReloadNotifier>, ReloadError> {
    match &config.pidfile {
        #[cfg(unix)]
        Some(pidfile) => Ok(Arc::new(crate::reload::PidfileNotifier::new(
            pidfile,
            &config.signal,
        )?)),
        #[cfg(not(unix))]
        Some(_) => Err(ReloadError::Unsupported),
        None => Ok(Arc::new(NoopNotifier)),
    }
}

/// Build the renderer described by the configuration.
pub fn build_template(config: &AppConfig) -> Result<TemplateFile, NameTemplateError> {
    let names = ServerNameTemplates::parse(&config.renderer.server_name_templates)?;
    Ok(TemplateFile::new(
        &config.renderer.template_path,
        &config.renderer.output_path,
        Arc::new(names),
    ))
}

/// Render the latest snapshot and, on success, notify the load balancer.
///
/// Returns true when both steps succeeded. A failed render leaves the
/// previous file in place and skips the notification.
pub fn apply_update(
    template: &dyn Template,
    store: &SnapshotStore,
    notifier: &dyn ReloadNotifier,
) -> bool {
    let snapshot = store.load();

    if let Err(e) = template.execute(&snapshot) {
        metrics::record_render(false);
        tracing::error!(error = %e, "Render failed, load balancer not reloaded");
        return false;
    }
    metrics::record_render(true);

    match notifier.notify() {
        Ok(()) => {
            metrics::record_reload(true);
            true
        }
        Err(e) => {
            metrics::record_reload(false);
            tracing::error!(error = %e, "Failed to notify load balancer");
            false
        }
    }
}

/// Run the watch → coordinate → render → reload loop until shutdown.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let template: Arc<dyn Template> = Arc::new(build_template(&config)?);
    let notifier = build_notifier(&config.reload)?;

    let source = config.snapshot.path.as_ref().map(|p| FileSnapshotSource::new(p));
    let store = Arc::new(SnapshotStore::default());
    let mut initial_render = false;
    if let Some(source) = &source {
        match source.snapshot() {
            Ok(info) => {
                store.publish(info);
                initial_render = true;
            }
            Err(e) => tracing::warn!(error = %e, "Initial snapshot unavailable, waiting for changes"),
        }
    }

    let update = {
        let template = template.clone();
        let store = store.clone();
        let notifier = notifier.clone();
        move || {
            let template = template.clone();
            let store = store.clone();
            let notifier = notifier.clone();
            async move {
                let result = tokio::task::spawn_blocking(move || {
                    apply_update(template.as_ref(), &store, notifier.as_ref())
                })
                .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Update task failed");
                }
            }
        }
    };

    let (updater, handle) = Updater::new(config.coordinator.quiescence(), update);
    let coordinator = tokio::spawn(updater.run());

    let mut watcher = ChangeWatcher::new(store.clone(), handle.clone())
        .with_template(&config.renderer.template_path);
    if let Some(source) = source {
        watcher = watcher.with_snapshot(source);
    }
    // Dropping the watcher stops event delivery.
    let _watcher = watcher.run()?;

    let hup = handle.clone();
    tokio::spawn(async move {
        if let Err(e) = signals::forward_reload_signals(hup).await {
            tracing::error!(error = %e, "Failed to install SIGHUP handler");
        }
    });

    if initial_render {
        handle.signal().await;
    }

    tokio::select! {
        _ = signals::shutdown_signal() => {}
        res = coordinator => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Update coordinator task failed");
            }
        }
    }
    Ok(())
}

/// Render a snapshot file once, without watching or notifying.
pub fn render_once(config: &AppConfig, snapshot: &Path) -> Result<(), StartupError> {
    let template = build_template(config)?;
    let info = FileSnapshotSource::new(snapshot).snapshot()?;
    template.execute(&info)?;
    Ok(())
}
