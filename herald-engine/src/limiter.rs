//! Quota & rate limiter: per-subscriber ceilings on notification
//! creation rate.
//!
//! Counters are keyed by (subscriber, hour bucket). The rolling-hour
//! rate is estimated with the standard two-bucket sliding window: the
//! previous bucket's count weighted by the unelapsed fraction of the
//! current hour, plus the current bucket's count. Increment happens
//! under the bucket's entry lock, so two concurrent events can never
//! both pass a stale read of "under quota."
//!
//! A throttled attempt is counted for observability but surfaces no
//! error: the triggering event was real, the subscriber simply chose a
//! broader scope than their plan sustains.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use herald_core::types::{SubscriberId, Timestamp};
use tracing::debug;

/// Sliding-window notification rate limiter.
#[derive(Debug, Default)]
pub struct RateLimiter {
    /// (subscriber, hour bucket) -> notifications admitted that hour.
    buckets: DashMap<(SubscriberId, u64), u32>,
    /// Per-subscriber throttled counters.
    throttled: DashMap<SubscriberId, u64>,
    throttled_total: AtomicU64,
    admitted_total: AtomicU64,
}

impl RateLimiter {
    /// Creates an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to admit one notification for `subscriber`.
    ///
    /// Returns true and counts the admission when the estimated rolling-
    /// hour rate is under `max_per_hour`; otherwise counts the attempt
    /// as throttled and returns false.
    pub fn try_acquire(
        &self,
        subscriber: &SubscriberId,
        max_per_hour: u32,
        now: Timestamp,
    ) -> bool {
        let bucket = now.hour_bucket();

        // Read the closed previous bucket before taking the current
        // bucket's entry lock; both keys may share a shard.
        let previous = bucket
            .checked_sub(1)
            .and_then(|prev| {
                self.buckets
                    .get(&(subscriber.clone(), prev))
                    .map(|count| *count)
            })
            .unwrap_or(0);

        let mut current = self
            .buckets
            .entry((subscriber.clone(), bucket))
            .or_insert(0);

        let estimated =
            f64::from(previous) * (1.0 - now.hour_fraction()) + f64::from(*current);
        if estimated >= f64::from(max_per_hour) {
            drop(current);
            *self.throttled.entry(subscriber.clone()).or_insert(0) += 1;
            self.throttled_total.fetch_add(1, Ordering::Relaxed);
            debug!(%subscriber, max_per_hour, "Notification throttled");
            return false;
        }

        *current += 1;
        drop(current);
        self.admitted_total.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Number of throttled attempts for a subscriber.
    #[must_use]
    pub fn throttled_for(&self, subscriber: &SubscriberId) -> u64 {
        self.throttled.get(subscriber).map_or(0, |count| *count)
    }

    /// Total throttled attempts across all subscribers.
    #[must_use]
    pub fn throttled_total(&self) -> u64 {
        self.throttled_total.load(Ordering::Relaxed)
    }

    /// Total admitted notifications across all subscribers.
    #[must_use]
    pub fn admitted_total(&self) -> u64 {
        self.admitted_total.load(Ordering::Relaxed)
    }

    /// Evicts buckets older than the previous hour.
    ///
    /// Run periodically; only the current and previous buckets
    /// participate in the sliding-window estimate.
    pub fn cleanup(&self, now: Timestamp) {
        let horizon = now.hour_bucket().saturating_sub(1);
        self.buckets.retain(|(_, bucket), _| *bucket >= horizon);
    }
}
