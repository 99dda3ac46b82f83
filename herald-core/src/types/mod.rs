//! Core identifier and value types.
//!
//! All identifiers are `NewType` wrappers so that a subscription id can
//! never be confused with an event id at a call site. Validation happens
//! at construction; `new_unchecked` constructors exist for values that
//! are already known to be valid (deserialized storage, test fixtures).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

mod confidence;
mod ids;
mod symbol;
mod timestamp;

pub use confidence::Confidence;
pub use ids::{StrategyId, SubscriberId};
pub use symbol::Symbol;
pub use timestamp::Timestamp;

/// Validation error for core value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Symbol string was empty.
    #[error("Symbol cannot be empty")]
    EmptySymbol,

    /// Symbol string contained invalid characters.
    #[error("Invalid symbol format: {0}")]
    InvalidSymbol(String),

    /// Subscriber identifier was empty.
    #[error("Subscriber id cannot be empty")]
    EmptySubscriberId,

    /// Strategy identifier was empty.
    #[error("Strategy id cannot be empty")]
    EmptyStrategyId,

    /// Timestamp was negative.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// Confidence value was above 100.
    #[error("Confidence out of range (0-100): {0}")]
    ConfidenceOutOfRange(u8),
}

macro_rules! sequential_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Zero id, used as the "nothing seen yet" cursor value.
            pub const ZERO: Self = Self(0);

            /// Creates a new id from a raw value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the id as a `u64`.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

sequential_id! {
    /// Unique identifier for a sequenced event.
    ///
    /// Assigned by the event sequencer; strictly increasing and never
    /// reused or renumbered.
    EventId
}

sequential_id! {
    /// Unique identifier for a subscription.
    SubscriptionId
}

sequential_id! {
    /// Unique identifier for a stored notification.
    ///
    /// Assigned by the notification store; strictly increasing, which is
    /// what makes it usable as a poll cursor.
    NotificationId
}
