//! Graceful shutdown and signal handling.
//!
//! On the first interrupt the server stops accepting, keep-alive is torn
//! down per-connection by the HTTP stack, and in-flight requests get a
//! bounded window to drain. A second interrupt during the drain forces an
//! immediate exit, and overrunning the deadline is fatal.

use std::time::Duration;

use axum_server::Handle;

/// Poll interval while waiting for connections to drain.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawn the shutdown sequencing task for the given server handle.
///
/// When an interrupt arrives:
/// 1. graceful shutdown is triggered on the handle (no new connections);
/// 2. the drain is raced against the grace deadline and against a second
///    interrupt;
/// 3. the deadline expiring logs an error and exits non-zero, a second
///    interrupt exits immediately, and a completed drain lets the serve
///    call return on its own.
pub fn spawn_shutdown_handler(handle: Handle, grace: Duration) {
    tokio::spawn(async move {
        wait_for_interrupt().await;
        tracing::info!("interrupt received, server is shutting down");

        // No deadline on the handle itself: the deadline race below decides
        // between a clean exit and a fatal one.
        handle.graceful_shutdown(None);

        tokio::select! {
            _ = wait_for_interrupt() => {
                tracing::warn!("second interrupt received, exiting immediately");
                std::process::exit(130);
            }
            _ = drained(&handle) => {
                tracing::info!("connections drained");
            }
            _ = tokio::time::sleep(grace) => {
                tracing::error!(
                    grace_secs = grace.as_secs(),
                    "could not gracefully shut down the server within the deadline"
                );
                std::process::exit(1);
            }
        }
    });
}

/// Wait for an interrupt: ctrl-c, or SIGTERM on Unix.
async fn wait_for_interrupt() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Resolve once the handle reports no remaining connections.
async fn drained(handle: &Handle) {
    while handle.connection_count() > 0 {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drained_resolves_with_no_connections() {
        let handle = Handle::new();
        // Never served, so the count is zero and the drain is immediate.
        tokio::time::timeout(Duration::from_secs(1), drained(&handle))
            .await
            .expect("drain should resolve immediately");
    }
}
