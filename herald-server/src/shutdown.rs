//! Graceful shutdown coordination.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::info;

/// Shutdown controller for coordinating graceful shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownController {
    initiated: Arc<AtomicBool>,
    tx: broadcast::Sender<()>,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    /// Creates a new shutdown controller.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            initiated: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    /// Initiates shutdown. Idempotent.
    pub fn initiate(&self) {
        if self
            .initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.tx.send(());
        }
    }

    /// Returns whether shutdown has been initiated.
    #[must_use]
    pub fn is_initiated(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }

    /// Resolves when shutdown is initiated.
    pub async fn wait(&self) {
        // Subscribe before checking the flag so an initiate() racing
        // between the two cannot be missed.
        let mut rx = self.tx.subscribe();
        if self.is_initiated() {
            return;
        }
        let _ = rx.recv().await;
    }
}

/// Listens for SIGINT/SIGTERM and initiates shutdown.
pub async fn listen_for_signals(controller: ShutdownController) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");

        tokio::select! {
            _ = sigint.recv() => info!("Received SIGINT (Ctrl+C)"),
            _ = sigterm.recv() => info!("Received SIGTERM"),
        }
        controller.initiate();
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup Ctrl+C handler");
        info!("Received Ctrl+C");
        controller.initiate();
    }
}
