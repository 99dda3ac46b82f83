//! Delivery channels and channel classes.
//!
//! A channel is one delivery surface for a notification. Channels fall
//! into three classes with different delivery contracts (see
//! [`ChannelClass`]); the dispatcher applies retry policy per class, not
//! per channel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A notification delivery surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// In-app badge and notification panel.
    InApp,
    /// Transient on-screen popup.
    Popup,
    /// Audible tone in the client.
    Sound,
    /// Push-style desktop alert.
    Desktop,
    /// Chat-bot message (Telegram).
    Telegram,
    /// Operator-curated public broadcast feed.
    Broadcast,
    /// Email to the subscriber's verified address.
    Email,
    /// HTTP POST to the subscriber's webhook URL.
    Webhook,
}

/// Delivery class of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelClass {
    /// Client-driven: the stored notification is the delivery; the
    /// client picks it up on its next poll. Nothing to retry server-side.
    Ephemeral,
    /// Push-style: at-least-once with bounded retry on transient failure.
    Durable,
    /// Push-style with a required verified address; delivery is rejected
    /// up front when no address is on file.
    Addressed,
}

impl Channel {
    /// All channels.
    pub const ALL: [Self; 8] = [
        Self::InApp,
        Self::Popup,
        Self::Sound,
        Self::Desktop,
        Self::Telegram,
        Self::Broadcast,
        Self::Email,
        Self::Webhook,
    ];

    /// Returns the wire name of this channel.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InApp => "in_app",
            Self::Popup => "popup",
            Self::Sound => "sound",
            Self::Desktop => "desktop",
            Self::Telegram => "telegram",
            Self::Broadcast => "broadcast",
            Self::Email => "email",
            Self::Webhook => "webhook",
        }
    }

    /// Returns the delivery class of this channel.
    #[must_use]
    pub const fn class(&self) -> ChannelClass {
        match self {
            Self::InApp | Self::Popup | Self::Sound => ChannelClass::Ephemeral,
            Self::Desktop | Self::Telegram | Self::Broadcast => ChannelClass::Durable,
            Self::Email | Self::Webhook => ChannelClass::Addressed,
        }
    }

    /// Returns true if delivery requires a verified subscriber address.
    #[must_use]
    pub const fn requires_address(&self) -> bool {
        matches!(self.class(), ChannelClass::Addressed)
    }

    /// Returns true if this is the operator-curated broadcast channel.
    ///
    /// Broadcast is assignable only through the admin capability path,
    /// never via plan quota.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        matches!(self, Self::Broadcast)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
