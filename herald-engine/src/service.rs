//! Alert service: wires the pipeline together.
//!
//! One `AlertService` owns the sequencer, registry, store, limiter, and
//! dispatcher for a process. It is constructed at service start,
//! injected where needed, and torn down on shutdown — no ambient
//! globals.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use herald_core::event::{SequencedEvent, StrategyEvent};
use herald_core::subscriber::SubscriberDirectory;
use herald_core::types::{EventId, Timestamp};
use tracing::{debug, info};

use crate::channels::SenderRegistry;
use crate::dispatcher::ChannelDispatcher;
use crate::limiter::RateLimiter;
use crate::matcher;
use crate::policy::QuotaPolicy;
use crate::registry::SubscriptionRegistry;
use crate::retry::RetryConfig;
use crate::sequencer::EventSequencer;
use crate::store::{NotificationStore, RecordOutcome};

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Retry policy for durable and addressed channels.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Counter snapshot for the health/stats surface.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    /// Events sequenced since start.
    pub events_sequenced: u64,
    /// Notifications created.
    pub notifications_created: u64,
    /// Duplicate matches suppressed by the store.
    pub notifications_deduplicated: u64,
    /// Creations dropped by the rate limiter.
    pub notifications_throttled: u64,
    /// Channel deliveries that succeeded.
    pub deliveries_succeeded: u64,
    /// Channel deliveries that failed after retries.
    pub deliveries_failed: u64,
    /// Channel deliveries rejected for missing address or sender.
    pub deliveries_unavailable: u64,
    /// Subscriptions in the registry, disabled included.
    pub subscriptions: usize,
}

/// The assembled alert pipeline.
pub struct AlertService {
    sequencer: Arc<EventSequencer>,
    registry: Arc<SubscriptionRegistry>,
    store: Arc<NotificationStore>,
    limiter: Arc<RateLimiter>,
    dispatcher: Arc<ChannelDispatcher>,
    directory: Arc<dyn SubscriberDirectory>,
    policy: Arc<QuotaPolicy>,
}

impl AlertService {
    /// Builds the full pipeline over the given directory and senders.
    #[must_use]
    pub fn new(
        directory: Arc<dyn SubscriberDirectory>,
        senders: SenderRegistry,
        config: ServiceConfig,
    ) -> Self {
        let policy = Arc::new(QuotaPolicy::new());
        let store = Arc::new(NotificationStore::new());
        let registry = Arc::new(SubscriptionRegistry::new(
            Arc::clone(&policy),
            Arc::clone(&directory),
        ));
        let dispatcher = Arc::new(ChannelDispatcher::new(
            senders,
            config.retry,
            Arc::clone(&store),
            Arc::clone(&directory),
        ));

        info!("Alert service assembled");
        Self {
            sequencer: Arc::new(EventSequencer::new()),
            registry,
            store,
            limiter: Arc::new(RateLimiter::new()),
            dispatcher,
            directory,
            policy,
        }
    }

    /// Sequences one inbound event and processes it through the
    /// pipeline. Channel dispatch continues asynchronously after this
    /// returns; the notification is already visible to polling.
    pub async fn ingest(&self, event: StrategyEvent) -> EventId {
        let sequenced = self.sequencer.append(event);
        self.process(&sequenced);
        sequenced.id
    }

    /// Re-processes every event after `since`, in order.
    ///
    /// At-least-once by design: the store's dedup key makes replay
    /// produce no second notification for pairs already recorded.
    pub fn replay_since(&self, since: EventId) -> usize {
        let events = self.sequencer.events_since(since);
        let count = events.len();
        info!(since = %since, count, "Replaying sequenced events");
        for event in &events {
            self.process(event);
        }
        count
    }

    /// Matches one sequenced event and records/dispatches per match.
    ///
    /// Failures for one subscription are isolated from the rest of the
    /// batch; throttled matches are dropped silently per the quota
    /// contract.
    fn process(&self, event: &SequencedEvent) {
        let snapshot = self.registry.enabled_snapshot();
        let matched = matcher::match_event(&snapshot, event);
        if matched.is_empty() {
            return;
        }
        debug!(event_id = %event.id, matches = matched.len(), "Event matched");

        for subscription in matched {
            // Replay fast-path: a pair that already has its notification
            // must not consume hourly quota again.
            if self.store.contains(subscription.id, event.id) {
                continue;
            }

            let quota = self
                .policy
                .effective(&subscription.owner, self.directory.plan(&subscription.owner));
            if !self.limiter.try_acquire(
                &subscription.owner,
                quota.max_notifications_per_hour,
                Timestamp::now(),
            ) {
                continue;
            }

            match self.store.record(subscription, event) {
                RecordOutcome::Created(notification) => {
                    self.registry.record_alert(subscription.id);
                    let _handles = self.dispatcher.dispatch(&notification);
                }
                RecordOutcome::AlreadyExists(_) => {}
            }
        }
    }

    /// Returns a counter snapshot.
    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            events_sequenced: self.sequencer.last_id().as_u64(),
            notifications_created: self.store.created_total(),
            notifications_deduplicated: self.store.deduplicated_total(),
            notifications_throttled: self.limiter.throttled_total(),
            deliveries_succeeded: self.dispatcher.delivered_total(),
            deliveries_failed: self.dispatcher.failed_total(),
            deliveries_unavailable: self.dispatcher.unavailable_total(),
            subscriptions: self.registry.len(),
        }
    }

    /// The event sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &Arc<EventSequencer> {
        &self.sequencer
    }

    /// The subscription registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// The notification store.
    #[must_use]
    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    /// The rate limiter.
    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// The channel dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<ChannelDispatcher> {
        &self.dispatcher
    }

    /// The subscriber directory.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn SubscriberDirectory> {
        &self.directory
    }

    /// The quota policy.
    #[must_use]
    pub fn policy(&self) -> &Arc<QuotaPolicy> {
        &self.policy
    }
}
