//! # Herald Engine
//!
//! The alert pipeline for the Herald platform.
//!
//! This crate provides:
//! - Event sequencing with strictly increasing ids and crash replay
//! - Subscription registry with plan-policy validation
//! - Pure event/subscription matching
//! - Idempotent notification recording with read/unread state
//! - Per-subscriber rolling-hour rate limiting
//! - Per-channel dispatch with class-specific retry policy
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │  Trade Engine  │ (external collaborator)
//! └───────┬────────┘
//!         │ ingest()
//!         ▼
//! ┌────────────────┐      ┌──────────────────────┐
//! │ EventSequencer │─────▶│     MatchEngine      │◀── SubscriptionRegistry
//! └────────────────┘      └──────────┬───────────┘
//!                                    │ per match
//!                                    ▼
//!                         ┌──────────────────────┐
//!                         │ RateLimiter (gate)   │
//!                         └──────────┬───────────┘
//!                                    ▼
//!                         ┌──────────────────────┐
//!                         │  NotificationStore   │──▶ poll / sync
//!                         └──────────┬───────────┘
//!                                    │ async fan-out
//!                                    ▼
//!                         ┌──────────────────────┐
//!                         │  ChannelDispatcher   │──▶ senders
//!                         └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use herald_core::prelude::*;
//! use herald_engine::{AlertService, SenderRegistry, ServiceConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let directory = Arc::new(InMemoryDirectory::new());
//! directory.upsert(SubscriberProfile::new(
//!     SubscriberId::new("trader@example.com").unwrap(),
//!     PlanTier::Free,
//! ));
//!
//! let service = AlertService::new(
//!     directory,
//!     SenderRegistry::new(),
//!     ServiceConfig::default(),
//! );
//!
//! let owner = SubscriberId::new("trader@example.com").unwrap();
//! let actor = herald_engine::Actor::subscriber(owner.clone());
//! service
//!     .registry()
//!     .create(
//!         &actor,
//!         &owner,
//!         SubscriptionConfig::all_events([Channel::InApp]),
//!     )
//!     .unwrap();
//!
//! let event = StrategyEvent::new(
//!     StrategyId::new("trend-h1").unwrap(),
//!     "Trend Following H1",
//!     Symbol::new("XAUUSD").unwrap(),
//!     EventType::Signal,
//!     EventPayload::new(Direction::Buy),
//! );
//! let event_id = service.ingest(event).await;
//! assert_eq!(event_id.as_u64(), 1);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::significant_drop_tightening)]

pub mod channels;
pub mod dispatcher;
pub mod limiter;
pub mod matcher;
pub mod policy;
pub mod registry;
pub mod retry;
pub mod sequencer;
pub mod service;
pub mod store;

pub use channels::{ChannelSender, InMemorySender, SenderRegistry, WebhookSender};
pub use dispatcher::ChannelDispatcher;
pub use limiter::RateLimiter;
pub use matcher::{match_event, matches};
pub use policy::QuotaPolicy;
pub use registry::{Actor, SubscriptionRegistry};
pub use retry::{RetryConfig, RetryPolicy};
pub use sequencer::EventSequencer;
pub use service::{AlertService, ServiceConfig, ServiceStats};
pub use store::{NotificationStore, RecordOutcome, SyncPage};
