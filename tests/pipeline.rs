//! Snapshot publish → coordinator → render, end to end.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lb_reloader::lifecycle::startup::apply_update;
use lb_reloader::reload::{ReloadError, ReloadNotifier};
use lb_reloader::{ServerNameTemplates, SnapshotStore, TemplateFile, Updater};

mod common;

#[derive(Default)]
struct CountingNotifier {
    calls: AtomicUsize,
}

impl ReloadNotifier for CountingNotifier {
    fn notify(&self) -> Result<(), ReloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_burst_of_publishes_renders_latest_once() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_template(
        dir.path(),
        "t.hbs",
        "{{#each Services}}{{Label this}}\n{{/each}}",
    );
    let target = dir.path().join("out.cfg");

    let template = Arc::new(TemplateFile::new(
        &source,
        &target,
        Arc::new(ServerNameTemplates::parse("").unwrap()),
    ));
    let store = Arc::new(SnapshotStore::default());
    let notifier = Arc::new(CountingNotifier::default());

    let update = {
        let (template, store, notifier) = (template.clone(), store.clone(), notifier.clone());
        move || {
            let (template, store, notifier) = (template.clone(), store.clone(), notifier.clone());
            async move {
                apply_update(template.as_ref(), &store, notifier.as_ref());
            }
        }
    };
    let (updater, handle) = Updater::new(Duration::from_millis(100), update);
    tokio::spawn(updater.run());

    // Each publish drops one more service.
    let mut cluster = common::sample_cluster();
    for _ in 0..3 {
        store.publish(cluster.clone());
        handle.signal().await;
        cluster.services.pop();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let n = notifier.clone();
    assert!(common::wait_for(2000, || n.calls.load(Ordering::SeqCst) == 1).await);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);

    // The last published snapshot had no services left.
    assert_eq!(fs::read_to_string(&target).unwrap(), "");
}

#[tokio::test]
async fn test_failed_render_is_retried_by_next_signal() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_template(dir.path(), "t.hbs", "{{Missing}}");
    let target = dir.path().join("out.cfg");

    let template = Arc::new(TemplateFile::new(
        &source,
        &target,
        Arc::new(ServerNameTemplates::parse("").unwrap()),
    ));
    let store = Arc::new(SnapshotStore::new(common::sample_cluster()));
    let notifier = Arc::new(CountingNotifier::default());
    let attempts = Arc::new(AtomicUsize::new(0));

    let update = {
        let (template, store, notifier, attempts) =
            (template.clone(), store.clone(), notifier.clone(), attempts.clone());
        move || {
            let (template, store, notifier, attempts) =
                (template.clone(), store.clone(), notifier.clone(), attempts.clone());
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                apply_update(template.as_ref(), &store, notifier.as_ref());
            }
        }
    };
    let (updater, handle) = Updater::new(Duration::from_millis(50), update);
    tokio::spawn(updater.run());

    handle.signal().await;
    let a = attempts.clone();
    assert!(common::wait_for(2000, || a.load(Ordering::SeqCst) == 1).await);
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    assert!(!target.exists());

    // No automatic retry.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    fs::write(&source, "{{Domain}}").unwrap();
    handle.signal().await;
    let n = notifier.clone();
    assert!(common::wait_for(2000, || n.calls.load(Ordering::SeqCst) == 1).await);
    assert_eq!(fs::read_to_string(&target).unwrap(), "cluster.local");
}
