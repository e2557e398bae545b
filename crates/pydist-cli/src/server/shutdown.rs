//! Graceful shutdown signal handling.

use std::time::Duration;

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;

use super::TRACING_TARGET_SHUTDOWN;

/// Waits for a shutdown signal (SIGTERM or SIGINT/Ctrl+C).
///
/// Returns once either signal arrives. The `shutdown_timeout` is reported
/// so operators know how long in-flight requests may keep draining.
pub async fn shutdown_signal(shutdown_timeout: Duration) {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                "Received Ctrl+C signal, initiating graceful shutdown"
            ),
            Err(err) => tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %err,
                "Failed to install Ctrl+C handler"
            ),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!(
                    target: TRACING_TARGET_SHUTDOWN,
                    "Received SIGTERM signal, initiating graceful shutdown"
                );
            }
            Err(err) => tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %err,
                "Failed to install SIGTERM handler"
            ),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        timeout_secs = shutdown_timeout.as_secs(),
        "Graceful shutdown initiated"
    );
}
