//! Durable notification records.
//!
//! A notification is the record that one subscription matched one event,
//! exactly once. It carries a denormalized snapshot of the event so that
//! history is stable even if the producer ever republishes, a read flag,
//! and a per-channel delivery map. Read state and delivery state are
//! orthogonal: a notification is visible to polling the moment it is
//! recorded, whatever its channels are doing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::channel::Channel;
use crate::event::{EventPayload, EventType, SequencedEvent};
use crate::types::{
    EventId, NotificationId, StrategyId, SubscriberId, SubscriptionId, Symbol, Timestamp,
};

/// Delivery status of one channel for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Delivery not yet attempted or still retrying.
    Pending,
    /// Delivered (for ephemeral channels: recorded and pollable).
    Delivered,
    /// Failed after all retry attempts.
    Failed,
    /// No verified address on file for an addressed channel.
    Unavailable,
}

impl DeliveryStatus {
    /// Returns true once no further attempts will be made.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Per-channel delivery state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryState {
    /// Current status.
    pub status: DeliveryStatus,
    /// Number of delivery attempts made.
    pub attempts: u32,
    /// Last error message, for failed or unavailable deliveries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl DeliveryState {
    /// Initial pending state.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            status: DeliveryStatus::Pending,
            attempts: 0,
            last_error: None,
        }
    }
}

/// Denormalized event snapshot embedded in a notification.
///
/// Copied at recording time so later changes anywhere else can never
/// rewrite notification history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    /// Originating event id.
    pub event_id: EventId,
    /// Lifecycle event type.
    pub event_type: EventType,
    /// Producing strategy.
    pub strategy_id: StrategyId,
    /// Strategy display name.
    pub strategy_name: String,
    /// Instrument.
    pub symbol: Symbol,
    /// Trade state at the moment of the event.
    pub payload: EventPayload,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

impl From<&SequencedEvent> for EventSnapshot {
    fn from(sequenced: &SequencedEvent) -> Self {
        Self {
            event_id: sequenced.id,
            event_type: sequenced.event.event_type,
            strategy_id: sequenced.event.strategy_id.clone(),
            strategy_name: sequenced.event.strategy_name.clone(),
            symbol: sequenced.event.symbol.clone(),
            payload: sequenced.event.payload.clone(),
            occurred_at: sequenced.event.occurred_at,
        }
    }
}

/// The durable record that a subscription matched an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification id; strictly increasing, usable as a poll cursor.
    pub id: NotificationId,
    /// Owning subscriber.
    pub owner: SubscriberId,
    /// Originating subscription.
    pub subscription_id: SubscriptionId,
    /// Originating event.
    pub event_id: EventId,
    /// Event snapshot at recording time.
    pub snapshot: EventSnapshot,
    /// Read flag, toggled by the subscriber.
    pub read: bool,
    /// Soft-delete flag; cleared notifications are excluded from all
    /// queries but never removed from storage.
    pub cleared: bool,
    /// Recording timestamp.
    pub created_at: Timestamp,
    /// Per-channel delivery state.
    pub delivery: HashMap<Channel, DeliveryState>,
}

impl Notification {
    /// Creates a new unread notification for the given match, with every
    /// requested channel initialized to `Pending`.
    #[must_use]
    pub fn new(
        id: NotificationId,
        owner: SubscriberId,
        subscription_id: SubscriptionId,
        sequenced: &SequencedEvent,
        channels: impl IntoIterator<Item = Channel>,
    ) -> Self {
        Self {
            id,
            owner,
            subscription_id,
            event_id: sequenced.id,
            snapshot: EventSnapshot::from(sequenced),
            read: false,
            cleared: false,
            created_at: Timestamp::now(),
            delivery: channels
                .into_iter()
                .map(|c| (c, DeliveryState::pending()))
                .collect(),
        }
    }

    /// Returns true if this notification warrants high-priority delivery.
    #[must_use]
    pub const fn is_high_priority(&self) -> bool {
        self.snapshot.event_type.is_high_priority()
    }

    /// Returns the requested channels.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.delivery.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Direction, EventPayload, StrategyEvent};

    fn sequenced() -> SequencedEvent {
        SequencedEvent {
            id: EventId::new(100),
            event: StrategyEvent::new(
                StrategyId::new_unchecked("trend-h1"),
                "Trend Following H1",
                Symbol::new_unchecked("XAUUSD"),
                EventType::NearSl,
                EventPayload::new(Direction::Buy),
            ),
        }
    }

    fn notification() -> Notification {
        Notification::new(
            NotificationId::new(1),
            SubscriberId::new_unchecked("user@example.com"),
            SubscriptionId::new(7),
            &sequenced(),
            [Channel::InApp, Channel::Email],
        )
    }

    #[test]
    fn test_new_notification_is_unread_and_pending() {
        let n = notification();
        assert!(!n.read);
        assert!(!n.cleared);
        assert_eq!(n.delivery.len(), 2);
        assert!(
            n.delivery
                .values()
                .all(|d| d.status == DeliveryStatus::Pending)
        );
    }

    #[test]
    fn test_snapshot_captures_event() {
        let n = notification();
        assert_eq!(n.event_id, EventId::new(100));
        assert_eq!(n.snapshot.event_type, EventType::NearSl);
        assert_eq!(n.snapshot.symbol.as_str(), "XAUUSD");
    }

    #[test]
    fn test_high_priority_follows_event_type() {
        let n = notification();
        assert!(n.is_high_priority());
    }

    #[test]
    fn test_delivery_status_terminal() {
        assert!(!DeliveryStatus::Pending.is_terminal());
        assert!(DeliveryStatus::Delivered.is_terminal());
        assert!(DeliveryStatus::Failed.is_terminal());
        assert!(DeliveryStatus::Unavailable.is_terminal());
    }

    #[test]
    fn test_notification_serde_roundtrip() {
        let n = notification();
        let json = serde_json::to_string(&n).unwrap();
        let parsed: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(n, parsed);
    }
}
