//! Tracing initialization.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable overriding the configured log filter.
pub const LOG_ENV: &str = "HERALD_LOG";

/// Initializes the global tracing subscriber.
///
/// The filter comes from `HERALD_LOG` when set, otherwise from the
/// configured level. Calling this twice is a no-op (the second
/// `try_init` fails quietly), which keeps tests that share a process
/// from panicking.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        init(&config);
        init(&config);
    }
}
