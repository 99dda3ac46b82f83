//! # Herald Server
//!
//! Main entry point for the Herald alert engine.
//!
//! ```bash
//! # Run with default configuration
//! herald-server
//!
//! # Run with a custom configuration file
//! herald-server --config /etc/herald/herald.toml
//!
//! # Run with environment variable overrides
//! HERALD_SERVER_PORT=9090 herald-server
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use herald_server::{HeraldServer, ServerConfig, logging};

/// Herald alert engine server.
#[derive(Parser, Debug)]
#[command(name = "herald-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "herald.toml")]
    config: PathBuf,

    /// Override the API bind host.
    #[arg(long, env = "HERALD_SERVER_HOST")]
    host: Option<String>,

    /// Override the API bind port.
    #[arg(long, env = "HERALD_SERVER_PORT")]
    port: Option<u16>,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if args.validate {
        println!("Configuration is valid");
        return;
    }

    logging::init(&config.logging);

    let mut server = HeraldServer::new(config);
    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Loads configuration from file and applies CLI/env overrides.
fn load_config(args: &Args) -> Result<ServerConfig, anyhow::Error> {
    let mut config = if args.config.exists() {
        ServerConfig::load(&args.config)?
    } else {
        eprintln!(
            "Configuration file not found: {}, using defaults",
            args.config.display()
        );
        ServerConfig::default()
    };

    if let Some(host) = &args.host {
        config.api.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if args.debug {
        config.logging.level = "debug".to_string();
    }

    Ok(config)
}
