//! Load balancer reload notification.
//!
//! # Responsibilities
//! - Read the load balancer PID from its pidfile
//! - Deliver the configured signal after a successful render
//!
//! # Design Decisions
//! - The pidfile is re-read on every notification, the process may have restarted
//! - No notification when no pidfile is configured

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Errors raised while notifying the load balancer.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("failed to read pidfile {path}: {source}")]
    Pidfile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pid `{0}`")]
    InvalidPid(String),

    #[error("unknown signal `{0}`")]
    UnknownSignal(String),

    #[cfg(unix)]
    #[error("failed to signal pid {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: nix::errno::Errno,
    },

    #[cfg(not(unix))]
    #[error("process signals are not supported on this platform")]
    Unsupported,
}

/// Tells the load balancer to pick up the new configuration.
pub trait ReloadNotifier: Send + Sync {
    fn notify(&self) -> Result<(), ReloadError>;
}

/// Notifier used when no pidfile is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ReloadNotifier for NoopNotifier {
    fn notify(&self) -> Result<(), ReloadError> {
        tracing::debug!("No pidfile configured, skipping reload notification");
        Ok(())
    }
}

/// Parse a signal name such as `SIGHUP` or `hup`.
#[cfg(unix)]
pub fn parse_signal(name: &str) -> Result<Signal, ReloadError> {
    let upper = name.trim().to_uppercase();
    let full = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{}", upper)
    };
    full.parse::<Signal>()
        .map_err(|_| ReloadError::UnknownSignal(name.to_string()))
}

#[cfg(not(unix))]
pub fn parse_signal(_name: &str) -> Result<(), ReloadError> {
    Err(ReloadError::Unsupported)
}

/// Read a PID from a pidfile. Surrounding whitespace is ignored.
pub fn read_pid(path: &Path) -> Result<i32, ReloadError> {
    let content = fs::read_to_string(path).map_err(|source| ReloadError::Pidfile {
        path: path.to_path_buf(),
        source,
    })?;
    let trimmed = content.trim();
    match trimmed.parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(ReloadError::InvalidPid(trimmed.to_string())),
    }
}

/// Signals the process whose PID is stored in a pidfile.
#[cfg(unix)]
#[derive(Debug, Clone)]
pub struct PidfileNotifier {
    pidfile: PathBuf,
    signal: Signal,
}

#[cfg(unix)]
impl PidfileNotifier {
    pub fn new(pidfile: impl AsRef<Path>, signal: &str) -> Result<Self, ReloadError> {
        Ok(Self {
            pidfile: pidfile.as_ref().to_path_buf(),
            signal: parse_signal(signal)?,
        })
    }
}

#[cfg(unix)]
impl ReloadNotifier for PidfileNotifier {
    fn notify(&self) -> Result<(), ReloadError> {
        let pid = read_pid(&self.pidfile)?;
        kill(Pid::from_raw(pid), self.signal).map_err(|source| ReloadError::Signal { pid, source })?;
        tracing::info!(pid, signal = ?self.signal, "Load balancer notified");
        Ok(())
    }
}
