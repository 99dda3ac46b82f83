//! Server assembly and run loop.
//!
//! Builds the process-wide components with an explicit lifecycle:
//! constructed at start, injected into the API state, torn down on
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use herald_api::AppState;
use herald_core::subscriber::{InMemoryDirectory, SubscriberDirectory};
use herald_engine::{AlertService, SenderRegistry, WebhookSender};
use tracing::info;

use crate::config::ServerConfig;
use crate::shutdown::{ShutdownController, listen_for_signals};

/// The assembled Herald server.
pub struct HeraldServer {
    config: ServerConfig,
    shutdown: ShutdownController,
    state: Option<Arc<AppState>>,
}

impl HeraldServer {
    /// Creates a server from configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let state = Self::assemble(&config);
        Self {
            config,
            shutdown: ShutdownController::new(),
            state: Some(state),
        }
    }

    fn assemble(config: &ServerConfig) -> Arc<AppState> {
        let directory = Arc::new(InMemoryDirectory::new());

        // The webhook transport lives in-process; mail, chat-bot, and
        // desktop push transports register here when their collaborator
        // crates are linked in.
        let senders = SenderRegistry::new()
            .with_sender(Arc::new(WebhookSender::new(Duration::from_secs(10))));

        let service = Arc::new(AlertService::new(
            Arc::clone(&directory) as Arc<dyn SubscriberDirectory>,
            senders,
            config.engine.clone(),
        ));

        Arc::new(AppState::new(config.api.clone(), service, directory))
    }

    /// The shutdown controller, for external orchestration.
    #[must_use]
    pub fn shutdown_controller(&self) -> ShutdownController {
        self.shutdown.clone()
    }

    /// Runs the server until a shutdown signal arrives.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let state = self
            .state
            .take()
            .expect("HeraldServer::run called twice");

        tokio::spawn(listen_for_signals(self.shutdown.clone()));

        let shutdown = self.shutdown.clone();
        info!(
            host = %state.config.host,
            port = state.config.port,
            "Starting Herald server"
        );
        herald_api::serve(state, async move { shutdown.wait().await }).await?;

        info!("Herald server stopped");
        Ok(())
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
