//! Layered server configuration.
//!
//! Loaded from a TOML file (`herald.toml` by default); every section is
//! optional and falls back to its defaults, so a minimal deployment
//! needs no file at all. CLI flags and environment variables override
//! individual fields after loading (see `main.rs`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use herald_api::ApiConfig;
use herald_engine::ServiceConfig;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid TOML for this schema.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Engine settings.
    #[serde(default)]
    pub engine: ServiceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (overridden by `HERALD_LOG` when set).
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
