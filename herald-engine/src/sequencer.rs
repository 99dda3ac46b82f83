//! Event sequencer: the single source of truth for "what happened, in
//! what order."
//!
//! The sequencer is the only component requiring a strict total order.
//! Id assignment and log append happen under one write lock, so an event
//! is visible to `events_since` readers the moment `append` returns, and
//! no event is ever reordered or renumbered.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use herald_core::event::{SequencedEvent, StrategyEvent};
use herald_core::types::EventId;
use tracing::debug;

/// Append-only event log with strictly increasing ids.
#[derive(Debug, Default)]
pub struct EventSequencer {
    /// Append-only log; the event with id `n` lives at index `n - 1`.
    log: RwLock<Vec<SequencedEvent>>,
    /// Mirror of the highest assigned id for lock-free reads.
    last_id: AtomicU64,
}

impl EventSequencer {
    /// Creates an empty sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next id and appends the event.
    ///
    /// The event is durably visible to [`events_since`](Self::events_since)
    /// before this returns.
    pub fn append(&self, event: StrategyEvent) -> SequencedEvent {
        let mut log = self.log.write();
        let id = EventId::new(log.len() as u64 + 1);
        let sequenced = SequencedEvent { id, event };
        log.push(sequenced.clone());
        self.last_id.store(id.as_u64(), Ordering::Release);
        debug!(event_id = %id, event_type = %sequenced.event.event_type, "Event sequenced");
        sequenced
    }

    /// Returns all events with an id strictly greater than `since`, in
    /// id order.
    ///
    /// Used for at-least-once re-delivery to the match engine after a
    /// crash; downstream dedup makes replay safe.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn events_since(&self, since: EventId) -> Vec<SequencedEvent> {
        let log = self.log.read();
        let start = (since.as_u64() as usize).min(log.len());
        log[start..].to_vec()
    }

    /// Returns the event with the given id, if sequenced.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn get(&self, id: EventId) -> Option<SequencedEvent> {
        if id == EventId::ZERO {
            return None;
        }
        self.log.read().get(id.as_u64() as usize - 1).cloned()
    }

    /// Returns the highest assigned id, or `EventId::ZERO` if empty.
    #[must_use]
    pub fn last_id(&self) -> EventId {
        EventId::new(self.last_id.load(Ordering::Acquire))
    }

    /// Returns the number of sequenced events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    /// Returns true if no events have been sequenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }
}
