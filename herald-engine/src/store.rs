//! Dedup & notification store.
//!
//! Turns a (subscription, event) match into exactly one stored
//! notification, however many times matching is retried, and owns
//! read/unread state. The dedup key is (subscription id, event id);
//! insertion is an atomic insert-if-absent, so concurrent racers on the
//! same key see one winner and the rest observe `AlreadyExists` — a
//! no-op, not an error.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use herald_core::channel::Channel;
use herald_core::error::StoreError;
use herald_core::event::SequencedEvent;
use herald_core::notification::{DeliveryStatus, Notification};
use herald_core::subscription::Subscription;
use herald_core::types::{EventId, NotificationId, SubscriberId, SubscriptionId};
use tracing::{debug, warn};

/// Outcome of a `record` call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// This call won the insert; the notification now exists.
    Created(Notification),
    /// A notification for this (subscription, event) pair already
    /// existed. Deliberately not an error.
    AlreadyExists(NotificationId),
}

/// One page of a cursor poll.
///
/// Every field is stable for a given cursor: re-polling with an
/// unchanged cursor returns a byte-identical page, so clients can skip
/// re-rendering on equality.
#[derive(Debug, Clone, Serialize)]
pub struct SyncPage {
    /// Notifications with id greater than the cursor, ascending.
    pub notifications: Vec<Notification>,
    /// The owner's current unread count.
    pub unread_count: u64,
    /// Highest id in this page, or the request cursor when empty.
    pub last_id: NotificationId,
}

/// Concurrent notification store with idempotent recording.
#[derive(Debug, Default)]
pub struct NotificationStore {
    notifications: DashMap<NotificationId, Notification>,
    dedup: DashMap<(SubscriptionId, EventId), NotificationId>,
    /// Per-owner id index, kept in ascending id order.
    by_owner: DashMap<SubscriberId, Vec<NotificationId>>,
    /// Per-owner unread counters, maintained transactionally with
    /// create/read/clear transitions so `unread_count` never scans.
    unread: DashMap<SubscriberId, u64>,
    next_id: AtomicU64,
    created_total: AtomicU64,
    deduplicated_total: AtomicU64,
}

impl NotificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    /// Records the match of `subscription` against `event`, exactly once.
    pub fn record(&self, subscription: &Subscription, event: &SequencedEvent) -> RecordOutcome {
        let key = (subscription.id, event.id);
        match self.dedup.entry(key) {
            Entry::Occupied(existing) => {
                self.deduplicated_total.fetch_add(1, Ordering::Relaxed);
                debug!(
                    subscription_id = %subscription.id,
                    event_id = %event.id,
                    "Duplicate match suppressed"
                );
                RecordOutcome::AlreadyExists(*existing.get())
            }
            Entry::Vacant(slot) => {
                // The vacant entry holds the dedup shard lock, so racers
                // on this key serialize here and exactly one wins.
                let id = NotificationId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
                let owner = subscription.owner.clone();
                let notification = Notification::new(
                    id,
                    owner.clone(),
                    subscription.id,
                    event,
                    subscription.config.channels.iter().copied(),
                );

                self.notifications.insert(id, notification.clone());
                {
                    let mut index = self.by_owner.entry(owner.clone()).or_default();
                    // Ids are globally monotonic but racers may arrive
                    // out of order; insert at the sorted position.
                    let pos = index.binary_search(&id).unwrap_or_else(|p| p);
                    index.insert(pos, id);
                }
                *self.unread.entry(owner).or_insert(0) += 1;
                self.created_total.fetch_add(1, Ordering::Relaxed);
                slot.insert(id);

                debug!(
                    notification_id = %id,
                    subscription_id = %subscription.id,
                    event_id = %event.id,
                    "Notification recorded"
                );
                RecordOutcome::Created(notification)
            }
        }
    }

    /// Returns true if a notification already exists for the pair.
    #[must_use]
    pub fn contains(&self, subscription_id: SubscriptionId, event_id: EventId) -> bool {
        self.dedup.contains_key(&(subscription_id, event_id))
    }

    /// Marks one notification read.
    pub fn mark_read(&self, owner: &SubscriberId, id: NotificationId) -> Result<(), StoreError> {
        let mut entry = self
            .notifications
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        if &entry.owner != owner {
            return Err(StoreError::NotOwner(id));
        }
        if entry.cleared {
            // Cleared is terminal; the notification no longer exists for
            // any query surface.
            return Err(StoreError::NotFound(id));
        }
        if !entry.read {
            entry.read = true;
            drop(entry);
            self.decrement_unread(owner, 1);
        }
        Ok(())
    }

    /// Marks every non-cleared notification of `owner` read.
    ///
    /// Returns the number of notifications flipped.
    pub fn mark_all_read(&self, owner: &SubscriberId) -> usize {
        let ids = self.owner_ids(owner);
        let mut flipped = 0usize;
        for id in ids {
            if let Some(mut entry) = self.notifications.get_mut(&id) {
                if !entry.cleared && !entry.read {
                    entry.read = true;
                    flipped += 1;
                }
            }
        }
        if flipped > 0 {
            self.decrement_unread(owner, flipped as u64);
        }
        flipped
    }

    /// Soft-deletes every notification of `owner`.
    ///
    /// Cleared notifications are excluded from all subsequent queries
    /// but remain in permanent storage; their ids are never reused.
    pub fn clear(&self, owner: &SubscriberId) -> usize {
        let ids = self.owner_ids(owner);
        let mut cleared = 0usize;
        let mut unread_cleared = 0u64;
        for id in ids {
            if let Some(mut entry) = self.notifications.get_mut(&id) {
                if !entry.cleared {
                    entry.cleared = true;
                    cleared += 1;
                    if !entry.read {
                        unread_cleared += 1;
                    }
                }
            }
        }
        if unread_cleared > 0 {
            self.decrement_unread(owner, unread_cleared);
        }
        debug!(%owner, cleared, "Notifications cleared");
        cleared
    }

    /// Returns the owner's unread count without scanning.
    #[must_use]
    pub fn unread_count(&self, owner: &SubscriberId) -> u64 {
        self.unread.get(owner).map_or(0, |count| *count)
    }

    /// Cursor poll: notifications with id strictly greater than `since`,
    /// ascending, excluding cleared, at most `limit`.
    #[must_use]
    pub fn sync(&self, owner: &SubscriberId, since: NotificationId, limit: usize) -> SyncPage {
        let ids = self.owner_ids(owner);
        let start = ids.partition_point(|id| *id <= since);

        let mut notifications = Vec::new();
        for id in &ids[start..] {
            if notifications.len() >= limit {
                break;
            }
            if let Some(entry) = self.notifications.get(id) {
                if !entry.cleared {
                    notifications.push(entry.clone());
                }
            }
        }

        let last_id = notifications.last().map_or(since, |n| n.id);
        SyncPage {
            notifications,
            unread_count: self.unread_count(owner),
            last_id,
        }
    }

    /// Returns one notification by id.
    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.notifications.get(&id).map(|n| n.clone())
    }

    /// Updates one channel's delivery state on a notification.
    ///
    /// Delivery state is orthogonal to read/cleared state and never
    /// affects visibility.
    pub fn set_delivery(
        &self,
        id: NotificationId,
        channel: Channel,
        status: DeliveryStatus,
        attempts: u32,
        last_error: Option<String>,
    ) {
        let Some(mut entry) = self.notifications.get_mut(&id) else {
            warn!(notification_id = %id, "Delivery update for unknown notification");
            return;
        };
        if let Some(state) = entry.delivery.get_mut(&channel) {
            state.status = status;
            state.attempts = attempts;
            state.last_error = last_error;
        } else {
            warn!(
                notification_id = %id,
                channel = %channel,
                "Delivery update for channel that was not requested"
            );
        }
    }

    /// Total notifications ever created.
    #[must_use]
    pub fn created_total(&self) -> u64 {
        self.created_total.load(Ordering::Relaxed)
    }

    /// Total duplicate matches suppressed.
    #[must_use]
    pub fn deduplicated_total(&self) -> u64 {
        self.deduplicated_total.load(Ordering::Relaxed)
    }

    fn owner_ids(&self, owner: &SubscriberId) -> Vec<NotificationId> {
        self.by_owner
            .get(owner)
            .map_or_else(Vec::new, |ids| ids.clone())
    }

    fn decrement_unread(&self, owner: &SubscriberId, by: u64) {
        if let Some(mut count) = self.unread.get_mut(owner) {
            *count = count.saturating_sub(by);
        }
    }
}
