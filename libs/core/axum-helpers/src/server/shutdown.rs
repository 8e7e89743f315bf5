use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Shutdown coordinator shared by the HTTP server and background workers.
///
/// Wraps a `watch` channel: the server waits on it for graceful shutdown,
/// workers get a receiver from [`subscribe`](Self::subscribe) and stop when
/// it flips to `true`.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Receiver that observes `true` once shutdown begins.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Check if shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        *self.tx.borrow()
    }

    /// Initiate shutdown and notify all subscribers.
    pub fn shutdown(&self) {
        let changed = self.tx.send_if_modified(|stopping| {
            let was_running = !*stopping;
            *stopping = true;
            was_running
        });
        if changed {
            info!("Shutdown initiated");
        }
    }

    /// Wait until an OS signal (SIGINT/SIGTERM) arrives or `shutdown` is
    /// called elsewhere, then notify all subscribers.
    pub async fn wait_for_signal(&self) {
        let mut rx = self.subscribe();

        tokio::select! {
            _ = shutdown_signal() => {}
            _ = rx.wait_for(|stopping| *stopping) => {}
        }

        self.shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is never observed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_programmatic_shutdown_reaches_subscribers() {
        let coordinator = ShutdownCoordinator::new();
        let mut worker_rx = coordinator.subscribe();
        assert!(!coordinator.is_shutting_down());

        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.wait_for_signal().await })
        };

        coordinator.shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        worker_rx.wait_for(|s| *s).await.unwrap();
        assert!(coordinator.is_shutting_down());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let coordinator = ShutdownCoordinator::default();
        coordinator.shutdown();
        coordinator.shutdown();
        assert!(*coordinator.subscribe().borrow());
    }
}
