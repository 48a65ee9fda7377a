//! Shutdown signal handling
//!
//! SIGINT (and SIGTERM on unix) cancel a shared token. Everything that must
//! stop on shutdown holds a clone or child of that token.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancel `token` when the process receives an interrupt or terminate signal
pub fn spawn_signal_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => {
                info!("Received signal. Shutting down.");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}

/// Wait until SIGINT or SIGTERM arrives
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for interrupt signal: {}", e);
        std::future::pending::<()>().await;
    }
}
