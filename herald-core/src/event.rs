//! Strategy lifecycle events.
//!
//! Events are produced by the external trade/strategy engine and describe
//! what happened to a tracked position: a new signal, an entry, a stop
//! management action, or a close. The event taxonomy below is the 11-type
//! superset emitted by the position tracker.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Confidence, EventId, StrategyId, Symbol, Timestamp};

/// Lifecycle event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// New signal detected.
    Signal,
    /// Virtual entry confirmed.
    Entry,
    /// Stop loss moved to break-even.
    BeMove,
    /// Partial close executed.
    Partial,
    /// Trailing stop activated.
    Trailing,
    /// Price approaching take profit.
    NearTp,
    /// Price approaching stop loss.
    NearSl,
    /// Position closed at take profit.
    ClosedTp,
    /// Position closed at stop loss.
    ClosedSl,
    /// Position closed by trailing stop.
    ClosedTrailing,
    /// Position closed at break-even.
    ClosedBe,
}

impl EventType {
    /// All event types, in lifecycle order.
    pub const ALL: [Self; 11] = [
        Self::Signal,
        Self::Entry,
        Self::BeMove,
        Self::Partial,
        Self::Trailing,
        Self::NearTp,
        Self::NearSl,
        Self::ClosedTp,
        Self::ClosedSl,
        Self::ClosedTrailing,
        Self::ClosedBe,
    ];

    /// Returns the wire name of this event type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Signal => "signal",
            Self::Entry => "entry",
            Self::BeMove => "be_move",
            Self::Partial => "partial",
            Self::Trailing => "trailing",
            Self::NearTp => "near_tp",
            Self::NearSl => "near_sl",
            Self::ClosedTp => "closed_tp",
            Self::ClosedSl => "closed_sl",
            Self::ClosedTrailing => "closed_trailing",
            Self::ClosedBe => "closed_be",
        }
    }

    /// Returns true if this event closes the position.
    #[must_use]
    pub const fn is_close(&self) -> bool {
        matches!(
            self,
            Self::ClosedTp | Self::ClosedSl | Self::ClosedTrailing | Self::ClosedBe
        )
    }

    /// Returns true if this event type warrants high-priority delivery.
    ///
    /// Stop-side events are the ones a subscriber cannot afford to miss.
    #[must_use]
    pub const fn is_high_priority(&self) -> bool {
        matches!(self, Self::NearSl | Self::ClosedSl)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Long position.
    Buy,
    /// Short position.
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Event payload: the trade state at the moment of the event.
///
/// All price fields are optional; a `signal` event may carry only entry
/// levels while a `closed_tp` event carries the realized P/L.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Trade direction.
    pub direction: Direction,
    /// Planned or actual entry price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<Decimal>,
    /// Price at the time of the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,
    /// Stop-loss level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    /// Take-profit level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    /// Signal confidence, when the producing strategy scores signals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    /// Profit/loss in account currency, where applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
    /// Free-text detail from the tracker ("TP1 hit, 50% closed").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl EventPayload {
    /// Creates a payload with only a direction.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            entry_price: None,
            current_price: None,
            stop_loss: None,
            take_profit: None,
            confidence: None,
            pnl: None,
            detail: None,
        }
    }

    /// Sets the entry price.
    #[must_use]
    pub fn with_entry_price(mut self, price: Decimal) -> Self {
        self.entry_price = Some(price);
        self
    }

    /// Sets the current price.
    #[must_use]
    pub fn with_current_price(mut self, price: Decimal) -> Self {
        self.current_price = Some(price);
        self
    }

    /// Sets the stop-loss level.
    #[must_use]
    pub fn with_stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// Sets the take-profit level.
    #[must_use]
    pub fn with_take_profit(mut self, price: Decimal) -> Self {
        self.take_profit = Some(price);
        self
    }

    /// Sets the signal confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Sets the profit/loss.
    #[must_use]
    pub fn with_pnl(mut self, pnl: Decimal) -> Self {
        self.pnl = Some(pnl);
        self
    }

    /// Sets the detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A lifecycle event as produced by the trade/strategy engine.
///
/// Immutable once sequenced; the core never mutates an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyEvent {
    /// Producing strategy.
    pub strategy_id: StrategyId,
    /// Human-readable strategy name, denormalized for display.
    pub strategy_name: String,
    /// Instrument the event concerns.
    pub symbol: Symbol,
    /// Lifecycle event type.
    pub event_type: EventType,
    /// When the event occurred, per the producer's clock.
    pub occurred_at: Timestamp,
    /// Trade state at the moment of the event.
    pub payload: EventPayload,
}

impl StrategyEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(
        strategy_id: StrategyId,
        strategy_name: impl Into<String>,
        symbol: Symbol,
        event_type: EventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            strategy_id,
            strategy_name: strategy_name.into(),
            symbol,
            event_type,
            occurred_at: Timestamp::now(),
            payload,
        }
    }

    /// Sets an explicit occurrence timestamp.
    #[must_use]
    pub fn with_occurred_at(mut self, at: Timestamp) -> Self {
        self.occurred_at = at;
        self
    }
}

/// An event with its sequencer-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    /// Globally unique, strictly increasing id.
    pub id: EventId,
    /// The sequenced event.
    pub event: StrategyEvent,
}

impl SequencedEvent {
    /// Returns the confidence carried by the event payload, if any.
    #[must_use]
    pub fn confidence(&self) -> Option<Confidence> {
        self.event.payload.confidence
    }
}
