//! Channel dispatcher: fans one stored notification out to each
//! requested channel independently.
//!
//! Each channel delivery runs in its own task with the retry policy of
//! its class; a slow or failing channel never delays the others and
//! never blocks the poll path. Whatever happens here, the notification
//! stays in the store — in-app visibility is independent of any
//! channel's delivery success.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use herald_core::channel::{Channel, ChannelClass};
use herald_core::error::SendError;
use herald_core::notification::{DeliveryStatus, Notification};
use herald_core::subscriber::SubscriberDirectory;
use herald_core::types::NotificationId;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::channels::SenderRegistry;
use crate::retry::{RetryConfig, RetryPolicy};
use crate::store::NotificationStore;

/// Per-channel delivery fan-out.
pub struct ChannelDispatcher {
    senders: SenderRegistry,
    retry: RetryPolicy,
    store: Arc<NotificationStore>,
    directory: Arc<dyn SubscriberDirectory>,
    delivered_total: AtomicU64,
    failed_total: AtomicU64,
    unavailable_total: AtomicU64,
}

impl ChannelDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        senders: SenderRegistry,
        retry: RetryConfig,
        store: Arc<NotificationStore>,
        directory: Arc<dyn SubscriberDirectory>,
    ) -> Self {
        Self {
            senders,
            retry: RetryPolicy::new(retry),
            store,
            directory,
            delivered_total: AtomicU64::new(0),
            failed_total: AtomicU64::new(0),
            unavailable_total: AtomicU64::new(0),
        }
    }

    /// Spawns one delivery task per requested channel.
    ///
    /// Returns the task handles so callers that need settled delivery
    /// state (tests, shutdown drains) can await them; the ingest path
    /// drops them and lets deliveries run to completion on their own.
    pub fn dispatch(self: &Arc<Self>, notification: &Notification) -> Vec<JoinHandle<()>> {
        notification
            .channels()
            .map(|channel| {
                let dispatcher = Arc::clone(self);
                let notification = notification.clone();
                tokio::spawn(async move {
                    dispatcher.deliver_channel(notification, channel).await;
                })
            })
            .collect()
    }

    /// Total deliveries that reached their channel.
    #[must_use]
    pub fn delivered_total(&self) -> u64 {
        self.delivered_total.load(Ordering::Relaxed)
    }

    /// Total deliveries that exhausted retries or failed permanently.
    #[must_use]
    pub fn failed_total(&self) -> u64 {
        self.failed_total.load(Ordering::Relaxed)
    }

    /// Total deliveries rejected for a missing address or sender.
    #[must_use]
    pub fn unavailable_total(&self) -> u64 {
        self.unavailable_total.load(Ordering::Relaxed)
    }

    async fn deliver_channel(&self, notification: Notification, channel: Channel) {
        let id = notification.id;

        // Ephemeral channels are client-driven: the stored notification
        // is the delivery, picked up on the subscriber's next poll.
        if matches!(channel.class(), ChannelClass::Ephemeral) {
            self.store
                .set_delivery(id, channel, DeliveryStatus::Delivered, 0, None);
            self.delivered_total.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let Some(profile) = self.directory.profile(&notification.owner) else {
            self.record_unavailable(id, channel, "subscriber not registered".to_string());
            return;
        };
        if channel.requires_address() && profile.address_for(channel).is_none() {
            self.record_unavailable(id, channel, format!("no {channel} address on file"));
            return;
        }
        let Some(sender) = self.senders.get(channel) else {
            self.record_unavailable(id, channel, format!("no sender registered for {channel}"));
            return;
        };

        let mut attempts = 0u32;
        loop {
            if attempts > 0 {
                tokio::time::sleep(self.retry.delay_for_attempt(attempts)).await;
            }
            match sender.send(&profile, &notification).await {
                Ok(()) => {
                    attempts += 1;
                    self.store
                        .set_delivery(id, channel, DeliveryStatus::Delivered, attempts, None);
                    self.delivered_total.fetch_add(1, Ordering::Relaxed);
                    debug!(notification_id = %id, %channel, attempts, "Channel delivery succeeded");
                    return;
                }
                Err(error) => {
                    attempts += 1;
                    warn!(
                        notification_id = %id,
                        %channel,
                        attempts,
                        %error,
                        "Channel delivery attempt failed"
                    );
                    if matches!(error, SendError::Unavailable(_)) {
                        self.store.set_delivery(
                            id,
                            channel,
                            DeliveryStatus::Unavailable,
                            attempts,
                            Some(error.to_string()),
                        );
                        self.unavailable_total.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                    if !error.is_transient() || !self.retry.should_retry(attempts) {
                        self.store.set_delivery(
                            id,
                            channel,
                            DeliveryStatus::Failed,
                            attempts,
                            Some(error.to_string()),
                        );
                        self.failed_total.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                }
            }
        }
    }

    fn record_unavailable(&self, id: NotificationId, channel: Channel, reason: String) {
        warn!(notification_id = %id, %channel, reason, "Channel unavailable");
        self.store
            .set_delivery(id, channel, DeliveryStatus::Unavailable, 0, Some(reason));
        self.unavailable_total.fetch_add(1, Ordering::Relaxed);
    }
}
