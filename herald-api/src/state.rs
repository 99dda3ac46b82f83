//! Shared application state for the API server.

use std::sync::Arc;

use herald_core::subscriber::InMemoryDirectory;
use herald_engine::AlertService;

use crate::config::ApiConfig;

/// Shared application state.
///
/// Holds the assembled alert pipeline plus the concrete subscriber
/// directory (the admin surface mutates profiles, which the
/// `SubscriberDirectory` trait deliberately does not expose).
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// The alert pipeline.
    pub service: Arc<AlertService>,
    /// Subscriber directory, writable through the admin routes.
    pub directory: Arc<InMemoryDirectory>,
}

impl AppState {
    /// Creates the application state.
    #[must_use]
    pub fn new(
        config: ApiConfig,
        service: Arc<AlertService>,
        directory: Arc<InMemoryDirectory>,
    ) -> Self {
        Self {
            config,
            service,
            directory,
        }
    }

    /// Clamps a client-requested page size to the configured maximum.
    #[must_use]
    pub fn poll_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.config.default_poll_limit)
            .min(self.config.max_poll_limit)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::subscriber::SubscriberDirectory;
    use herald_engine::{SenderRegistry, ServiceConfig};

    fn state() -> AppState {
        let directory = Arc::new(InMemoryDirectory::new());
        let service = Arc::new(AlertService::new(
            Arc::clone(&directory) as Arc<dyn SubscriberDirectory>,
            SenderRegistry::new(),
            ServiceConfig::default(),
        ));
        AppState::new(ApiConfig::default(), service, directory)
    }

    #[test]
    fn test_poll_limit_clamping() {
        let state = state();
        assert_eq!(state.poll_limit(None), 50);
        assert_eq!(state.poll_limit(Some(10)), 10);
        assert_eq!(state.poll_limit(Some(10_000)), 500);
        assert_eq!(state.poll_limit(Some(0)), 1);
    }
}
