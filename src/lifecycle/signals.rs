//! OS signal handling.
//!
//! # Responsibilities
//! - SIGHUP schedules a re-render through the update coordinator
//! - SIGTERM/SIGINT end the process

use crate::update::UpdateHandle;

/// Forward every SIGHUP to the update coordinator.
#[cfg(unix)]
pub async fn forward_reload_signals(handle: UpdateHandle) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    while hangup.recv().await.is_some() {
        tracing::info!("SIGHUP received, scheduling re-render");
        handle.signal().await;
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn forward_reload_signals(_handle: UpdateHandle) -> std::io::Result<()> {
    std::future::pending().await
}

/// Resolves when the process is asked to terminate.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}
