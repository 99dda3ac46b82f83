//! API configuration.

use serde::{Deserialize, Serialize};

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS settings.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Default page size for `GET /notifications`.
    #[serde(default = "default_poll_limit")]
    pub default_poll_limit: usize,
    /// Maximum page size a client may request.
    #[serde(default = "default_max_poll_limit")]
    pub max_poll_limit: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_poll_limit() -> usize {
    50
}

fn default_max_poll_limit() -> usize {
    500
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
            default_poll_limit: default_poll_limit(),
            max_poll_limit: default_max_poll_limit(),
        }
    }
}

impl ApiConfig {
    /// Returns the socket address string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Whether CORS headers are emitted.
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
    /// Allowed origins; empty means any.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Preflight cache lifetime in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

fn default_cors_enabled() -> bool {
    true
}

fn default_max_age_secs() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: Vec::new(),
            max_age_secs: default_max_age_secs(),
        }
    }
}
