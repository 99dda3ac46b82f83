//! Channel senders: the abstract delivery contract and built-in
//! implementations.
//!
//! The engine depends only on [`ChannelSender`]; concrete transports
//! (mail relay, chat-bot API, push service) are external collaborators
//! that implement it. The webhook sender ships here because its
//! transport is plain HTTP; the in-memory sender exists for tests and
//! local development.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use herald_core::channel::Channel;
use herald_core::error::SendError;
use herald_core::notification::Notification;
use herald_core::subscriber::SubscriberProfile;
use herald_core::types::{NotificationId, SubscriberId};
use tracing::debug;

/// One delivery transport for one channel.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// The channel this sender delivers.
    fn channel(&self) -> Channel;

    /// Delivers one notification to one subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Transient`] for failures worth retrying and
    /// [`SendError::Permanent`] or [`SendError::Unavailable`] for ones
    /// that are not.
    async fn send(
        &self,
        recipient: &SubscriberProfile,
        notification: &Notification,
    ) -> Result<(), SendError>;
}

/// Registry of channel senders, one per channel.
#[derive(Default)]
pub struct SenderRegistry {
    senders: HashMap<Channel, Arc<dyn ChannelSender>>,
}

impl SenderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sender for its channel, replacing any previous one.
    #[must_use]
    pub fn with_sender(mut self, sender: Arc<dyn ChannelSender>) -> Self {
        self.senders.insert(sender.channel(), sender);
        self
    }

    /// Registers a sender for its channel.
    pub fn register(&mut self, sender: Arc<dyn ChannelSender>) {
        self.senders.insert(sender.channel(), sender);
    }

    /// Returns the sender for a channel, if registered.
    #[must_use]
    pub fn get(&self, channel: Channel) -> Option<Arc<dyn ChannelSender>> {
        self.senders.get(&channel).map(Arc::clone)
    }

    /// Returns the number of registered senders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Returns true if no senders are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

/// In-memory sender for tests and local development.
///
/// Records every delivery and can be switched into a failure mode to
/// exercise the dispatcher's retry and failure paths.
pub struct InMemorySender {
    channel: Channel,
    delivered: RwLock<Vec<(SubscriberId, NotificationId)>>,
    failure: RwLock<Option<SendError>>,
}

impl InMemorySender {
    /// Creates a sender for the given channel.
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            delivered: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
        }
    }

    /// Makes every subsequent send fail with the given error.
    pub fn fail_with(&self, error: SendError) {
        *self.failure.write() = Some(error);
    }

    /// Restores normal delivery.
    pub fn succeed(&self) {
        *self.failure.write() = None;
    }

    /// Returns the recorded deliveries.
    #[must_use]
    pub fn deliveries(&self) -> Vec<(SubscriberId, NotificationId)> {
        self.delivered.read().clone()
    }

    /// Returns the number of recorded deliveries.
    #[must_use]
    pub fn delivery_count(&self) -> usize {
        self.delivered.read().len()
    }
}

#[async_trait]
impl ChannelSender for InMemorySender {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(
        &self,
        recipient: &SubscriberProfile,
        notification: &Notification,
    ) -> Result<(), SendError> {
        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }
        self.delivered
            .write()
            .push((recipient.id.clone(), notification.id));
        debug!(
            channel = %self.channel,
            notification_id = %notification.id,
            "Notification delivered in-memory"
        );
        Ok(())
    }
}

/// Webhook sender: POSTs the notification as JSON to the subscriber's
/// registered URL.
pub struct WebhookSender {
    client: reqwest::Client,
}

impl WebhookSender {
    /// Creates a webhook sender with the given request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for WebhookSender {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl ChannelSender for WebhookSender {
    fn channel(&self) -> Channel {
        Channel::Webhook
    }

    async fn send(
        &self,
        recipient: &SubscriberProfile,
        notification: &Notification,
    ) -> Result<(), SendError> {
        let url = recipient
            .address_for(Channel::Webhook)
            .ok_or(SendError::Unavailable(Channel::Webhook))?;

        let response = self
            .client
            .post(url)
            .json(notification)
            .send()
            .await
            .map_err(|e| SendError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(
                notification_id = %notification.id,
                %status,
                "Webhook delivery succeeded"
            );
            Ok(())
        } else if status.is_server_error() || status.as_u16() == 429 {
            Err(SendError::Transient(format!("HTTP {status}")))
        } else {
            Err(SendError::Permanent(format!("HTTP {status}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::event::{
        Direction, EventPayload, EventType, SequencedEvent, StrategyEvent,
    };
    use herald_core::plan::PlanTier;
    use herald_core::types::{EventId, StrategyId, SubscriptionId, Symbol};

    fn profile() -> SubscriberProfile {
        SubscriberProfile::new(
            SubscriberId::new_unchecked("trader@x.com"),
            PlanTier::Premium,
        )
    }

    fn notification() -> Notification {
        let sequenced = SequencedEvent {
            id: EventId::new(1),
            event: StrategyEvent::new(
                StrategyId::new_unchecked("trend-h1"),
                "Trend Following H1",
                Symbol::new_unchecked("EURUSD"),
                EventType::Signal,
                EventPayload::new(Direction::Buy),
            ),
        };
        Notification::new(
            NotificationId::new(1),
            SubscriberId::new_unchecked("trader@x.com"),
            SubscriptionId::new(1),
            &sequenced,
            [Channel::InApp],
        )
    }

    #[tokio::test]
    async fn test_in_memory_sender_records_deliveries() {
        let sender = InMemorySender::new(Channel::Desktop);
        sender.send(&profile(), &notification()).await.unwrap();

        assert_eq!(sender.delivery_count(), 1);
        assert_eq!(sender.deliveries()[0].1, NotificationId::new(1));
    }

    #[tokio::test]
    async fn test_in_memory_sender_failure_mode() {
        let sender = InMemorySender::new(Channel::Desktop);
        sender.fail_with(SendError::Transient("provider down".into()));

        let result = sender.send(&profile(), &notification()).await;
        assert!(matches!(result, Err(SendError::Transient(_))));
        assert_eq!(sender.delivery_count(), 0);

        sender.succeed();
        assert!(sender.send(&profile(), &notification()).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_sender_requires_address() {
        let sender = WebhookSender::default();
        let result = sender.send(&profile(), &notification()).await;
        assert_eq!(result, Err(SendError::Unavailable(Channel::Webhook)));
    }

    #[test]
    fn test_sender_registry() {
        let registry = SenderRegistry::new()
            .with_sender(Arc::new(InMemorySender::new(Channel::Desktop)))
            .with_sender(Arc::new(InMemorySender::new(Channel::Email)));

        assert_eq!(registry.len(), 2);
        assert!(registry.get(Channel::Desktop).is_some());
        assert!(registry.get(Channel::Telegram).is_none());
    }
}
