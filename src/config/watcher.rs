//! File watcher for snapshot and template changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::topology::{FileSnapshotSource, SnapshotSource, SnapshotStore};
use crate::update::UpdateHandle;

/// Watches the snapshot file (and optionally the template) and signals the
/// update coordinator on every change.
///
/// Parent directories are watched so files replaced by rename are still seen.
pub struct ChangeWatcher {
    snapshot: Option<FileSnapshotSource>,
    template: Option<PathBuf>,
    store: Arc<SnapshotStore>,
    handle: UpdateHandle,
}

impl ChangeWatcher {
    pub fn new(store: Arc<SnapshotStore>, handle: UpdateHandle) -> Self {
        Self {
            snapshot: None,
            template: None,
            store,
            handle,
        }
    }

    /// Load snapshots from `source` whenever its file changes.
    pub fn with_snapshot(mut self, source: FileSnapshotSource) -> Self {
        self.snapshot = Some(source);
        self
    }

    /// Re-render when the template file changes.
    pub fn with_template(mut self, path: impl AsRef<Path>) -> Self {
        self.template = Some(path.as_ref().to_path_buf());
        self
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for events to be delivered.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for path in self.watched_files() {
            let dir = parent_dir(&path);
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }

        let Self {
            snapshot,
            template,
            store,
            handle,
        } = self;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let mut changed = false;

                    if let Some(source) = &snapshot {
                        if touches(&event, source.path()) {
                            match source.snapshot() {
                                Ok(info) => {
                                    store.publish(info);
                                    changed = true;
                                }
                                Err(e) => {
                                    tracing::error!(error = %e, "Failed to reload snapshot, keeping current one");
                                }
                            }
                        }
                    }

                    if let Some(path) = &template {
                        if touches(&event, path) {
                            tracing::info!(path = %path.display(), "Template change detected");
                            changed = true;
                        }
                    }

                    if changed {
                        handle.blocking_signal();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            tracing::info!(path = %dir.display(), "Watching for changes");
        }
        Ok(watcher)
    }

    fn watched_files(&self) -> Vec<PathBuf> {
        self.snapshot
            .iter()
            .map(|s| s.path().to_path_buf())
            .chain(self.template.iter().cloned())
            .collect()
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True when the event concerns `path`, compared by file name within the
/// watched directory.
fn touches(event: &Event, path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}
