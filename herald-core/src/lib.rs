//! # Herald Core
//!
//! Core types, data model, and plan policy for the Herald alert
//! subscription and notification-delivery engine.
//!
//! This crate provides:
//! - Identifier `NewType` wrappers (`SubscriberId`, `SubscriptionId`,
//!   `EventId`, `NotificationId`, `StrategyId`, `Symbol`)
//! - The strategy lifecycle event taxonomy ([`EventType`]) and event
//!   records ([`StrategyEvent`], [`SequencedEvent`])
//! - Subscription filter configuration with first-class wildcard scopes
//! - The durable [`Notification`] record and per-channel delivery state
//! - Plan tiers, quota presets, and the [`SubscriberDirectory`]
//! - Error types shared across the engine and API crates

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

/// Core identifier and value types.
pub mod types;

/// Strategy lifecycle events.
pub mod event;

/// Delivery channels and channel classes.
pub mod channel;

/// Subscription filter configuration and records.
pub mod subscription;

/// Durable notification records.
pub mod notification;

/// Plan tiers and quota presets.
pub mod plan;

/// Subscriber profiles and directory.
pub mod subscriber;

/// Error types.
pub mod error;

pub use channel::{Channel, ChannelClass};
pub use error::{RegistryError, SendError, StoreError};
pub use event::{Direction, EventPayload, EventType, SequencedEvent, StrategyEvent};
pub use notification::{DeliveryState, DeliveryStatus, EventSnapshot, Notification};
pub use plan::{PlanQuota, PlanTier};
pub use subscriber::{InMemoryDirectory, SubscriberDirectory, SubscriberProfile};
pub use subscription::{
    EventTypeScope, StrategyScope, Subscription, SubscriptionConfig, SymbolScope, Wildcard,
};
pub use types::{
    Confidence, EventId, NotificationId, StrategyId, SubscriberId, SubscriptionId, Symbol,
    Timestamp, ValidationError,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::channel::{Channel, ChannelClass};
    pub use crate::error::{RegistryError, SendError, StoreError};
    pub use crate::event::{Direction, EventPayload, EventType, SequencedEvent, StrategyEvent};
    pub use crate::notification::{DeliveryState, DeliveryStatus, Notification};
    pub use crate::plan::{PlanQuota, PlanTier};
    pub use crate::subscriber::{InMemoryDirectory, SubscriberDirectory, SubscriberProfile};
    pub use crate::subscription::{Subscription, SubscriptionConfig};
    pub use crate::types::{
        Confidence, EventId, NotificationId, StrategyId, SubscriberId, SubscriptionId, Symbol,
        Timestamp,
    };
}
