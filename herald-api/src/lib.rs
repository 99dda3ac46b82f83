//! # Herald API
//!
//! HTTP surface for the Herald alert engine.
//!
//! Three route tiers, mirroring the consumers of the core:
//! - Subscriber routes: subscription CRUD, cursor polling, read/clear
//! - Service routes: event ingestion from the trade/strategy engine
//! - Admin routes: privileged subscription variants, subscriber
//!   registration and plan changes, quota overrides, stats
//!
//! Authentication itself lives in the fronting gateway; requests arrive
//! with the verified identity in `X-Herald-Subscriber` and
//! `X-Herald-Role` headers, which the identity middleware turns into an
//! [`middleware::AuthenticatedSubscriber`] extension.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// API configuration.
pub mod config;

/// API error types.
pub mod error;

/// Request handlers.
pub mod handlers;

/// Identity middleware and extractor.
pub mod middleware;

/// Response envelopes.
pub mod response;

/// Route definitions.
pub mod routes;

/// HTTP server entry point.
pub mod server;

/// Shared application state.
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, EmptyResponse};
pub use routes::create_router;
pub use server::serve;
pub use state::AppState;
