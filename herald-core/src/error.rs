//! Error types shared by the engine and API crates.
//!
//! Validation and policy errors surface synchronously to API callers;
//! per-channel delivery errors are recorded on the notification and are
//! never fatal to it. `AlreadyExists` is deliberately not here: dedup
//! hits are an outcome, not an error.

use thiserror::Error;

use crate::channel::Channel;
use crate::types::{NotificationId, SubscriberId, SubscriptionId};

/// Errors from subscription registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Malformed filter configuration (empty explicit scope, empty
    /// channel set).
    #[error("Invalid subscription config: {0}")]
    InvalidConfig(String),

    /// The requested channel is outside the subscriber's plan.
    #[error("Channel not allowed on current plan: {0}")]
    ChannelNotAllowed(Channel),

    /// Capability violation (broadcast assignment, foreign mutation).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The plan's enabled-subscription ceiling was reached.
    #[error("Subscription quota exceeded (limit {limit})")]
    QuotaExceeded {
        /// The ceiling that was hit.
        limit: u32,
    },

    /// No subscription with the given id.
    #[error("Subscription not found: {0}")]
    NotFound(SubscriptionId),

    /// The subscriber is not registered in the directory.
    #[error("Unknown subscriber: {0}")]
    UnknownSubscriber(SubscriberId),
}

/// Errors from notification store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No notification with the given id.
    #[error("Notification not found: {0}")]
    NotFound(NotificationId),

    /// The notification belongs to a different subscriber.
    #[error("Notification {0} does not belong to the caller")]
    NotOwner(NotificationId),
}

/// Errors from channel senders.
///
/// The dispatcher retries `Transient` failures and gives up immediately
/// on `Permanent` ones; both end up in the per-channel delivery map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Provider failure that may succeed on retry.
    #[error("Transient delivery failure: {0}")]
    Transient(String),

    /// Provider failure that will not succeed on retry.
    #[error("Permanent delivery failure: {0}")]
    Permanent(String),

    /// The subscriber has no verified address for the channel.
    #[error("No verified address for channel {0}")]
    Unavailable(Channel),
}

impl SendError {
    /// Returns true if the dispatcher should retry after this error.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
