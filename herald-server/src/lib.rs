//! # Herald Server
//!
//! Process lifecycle for the Herald alert engine: configuration
//! loading, logging initialization, component assembly, and graceful
//! shutdown.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

/// Layered server configuration.
pub mod config;

/// Tracing initialization.
pub mod logging;

/// Server assembly and run loop.
pub mod server;

/// Graceful shutdown coordination.
pub mod shutdown;

pub use config::{LoggingConfig, ServerConfig};
pub use server::HeraldServer;
pub use shutdown::ShutdownController;
