//! Anti-burst update coordinator.
//!
//! # States
//! ```text
//! Idle → Pending: signal()
//! Pending → Firing: quiescence window elapsed without a signal
//! Firing → Idle: consumer picks up the fire event
//! Firing → Pending: signal() raced with the pickup, another fire follows
//! ```
//!
//! The consumer only runs the update after its own `Firing → Idle` clear
//! succeeds. A fire picked up in any other state is dropped: `Pending`
//! means a later fire is already guaranteed, `Idle` means the fire was
//! queued behind an update that already covered it.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::observability::metrics;

/// Quiet time required before a pending update fires.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_secs(1);

/// Coordinator state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle = 0,
    Pending = 1,
    Firing = 2,
}

impl From<u8> for UpdateState {
    fn from(val: u8) -> Self {
        match val {
            1 => UpdateState::Pending,
            2 => UpdateState::Firing,
            _ => UpdateState::Idle,
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: AtomicU8,
}

impl Shared {
    fn state(&self) -> UpdateState {
        UpdateState::from(self.state.load(Ordering::SeqCst))
    }

    fn transition(&self, from: UpdateState, to: UpdateState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Wake-up carrying an acknowledgement back to the signaller.
type Wake = oneshot::Sender<()>;

/// Cloneable handle used to report changes.
#[derive(Debug, Clone)]
pub struct UpdateHandle {
    shared: Arc<Shared>,
    wake_tx: mpsc::Sender<Wake>,
}

impl UpdateHandle {
    /// Mark an update as pending and restart the quiescence window.
    ///
    /// Returns once the timer loop acknowledged the wake-up.
    pub async fn signal(&self) {
        self.mark_pending();
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.wake_tx.send(ack_tx).await.is_err() {
            tracing::warn!("Update coordinator is not running, signal dropped");
            return;
        }
        let _ = ack_rx.await;
    }

    /// Same as [`signal`](Self::signal), for callers outside the runtime
    /// such as file watcher threads.
    ///
    /// Panics if called from within an async context.
    pub fn blocking_signal(&self) {
        self.mark_pending();
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.wake_tx.blocking_send(ack_tx).is_err() {
            tracing::warn!("Update coordinator is not running, signal dropped");
            return;
        }
        let _ = ack_rx.blocking_recv();
    }

    /// Current coordinator state.
    pub fn state(&self) -> UpdateState {
        self.shared.state()
    }

    fn mark_pending(&self) {
        let previous = UpdateState::from(
            self.shared
                .state
                .swap(UpdateState::Pending as u8, Ordering::SeqCst),
        );
        tracing::trace!(previous = ?previous, "Update signalled");
        metrics::record_signal();
    }
}

/// Runs an update function at most once per quiescence window.
pub struct Updater<F> {
    shared: Arc<Shared>,
    wake_rx: mpsc::Receiver<Wake>,
    quiescence: Duration,
    update: F,
}

impl<F, Fut> Updater<F>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    /// Create a coordinator around `update`.
    ///
    /// Returns the coordinator and a handle for signalling changes.
    pub fn new(quiescence: Duration, update: F) -> (Self, UpdateHandle) {
        let shared = Arc::new(Shared {
            state: AtomicU8::new(UpdateState::Idle as u8),
        });
        let (wake_tx, wake_rx) = mpsc::channel(1);

        let handle = UpdateHandle {
            shared: shared.clone(),
            wake_tx,
        };
        let updater = Self {
            shared,
            wake_rx,
            quiescence,
            update,
        };
        (updater, handle)
    }

    /// Drive the coordinator. Runs for the lifetime of the process.
    ///
    /// Must be called within a Tokio runtime; the quiescence loop is spawned
    /// as a separate task.
    pub async fn run(mut self) {
        let (fire_tx, mut fire_rx) = mpsc::channel(1);

        tracing::info!(
            quiescence_ms = self.quiescence.as_millis() as u64,
            "Update coordinator starting"
        );

        tokio::spawn(quiescence_loop(
            self.shared.clone(),
            self.wake_rx,
            fire_tx,
            self.quiescence,
        ));

        while fire_rx.recv().await.is_some() {
            if !self.shared.transition(UpdateState::Firing, UpdateState::Idle) {
                match self.shared.state() {
                    UpdateState::Pending => tracing::debug!(
                        "Signal raced with update start, another update will follow"
                    ),
                    state => tracing::debug!(state = ?state, "Stale fire event dropped"),
                }
                continue;
            }
            metrics::record_update();
            tracing::debug!("Running update");
            (self.update)().await;
        }

        tracing::info!("Update coordinator stopped");
    }
}

async fn quiescence_loop(
    shared: Arc<Shared>,
    mut wake_rx: mpsc::Receiver<Wake>,
    fire_tx: mpsc::Sender<()>,
    quiescence: Duration,
) {
    let mut handles_open = true;
    loop {
        tokio::select! {
            wake = wake_rx.recv(), if handles_open => match wake {
                // Looping restarts the window.
                Some(ack) => {
                    let _ = ack.send(());
                }
                None => {
                    tracing::debug!("All update handles dropped");
                    handles_open = false;
                }
            },
            _ = tokio::time::sleep(quiescence) => {
                if shared.transition(UpdateState::Pending, UpdateState::Firing) {
                    tracing::debug!("Quiescence window elapsed, firing update");
                    if fire_tx.send(()).await.is_err() {
                        return;
                    }
                } else if !handles_open && shared.state() == UpdateState::Idle {
                    return;
                }
            }
        }
    }
}
