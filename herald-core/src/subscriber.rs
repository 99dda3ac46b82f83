//! Subscriber profiles and directory.
//!
//! Subscribers are registered by external collaborators (sign-up flow,
//! billing) and never hard-deleted. The engine reads profiles through
//! the [`SubscriberDirectory`] trait: the registry for plan lookups, the
//! dispatcher for channel addresses.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::plan::PlanTier;
use crate::types::{SubscriberId, Timestamp};

/// A subscriber's identity, addresses, and plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberProfile {
    /// Subscriber id.
    pub id: SubscriberId,
    /// Current plan tier; mutated by the billing collaborator.
    pub plan: PlanTier,
    /// Verified email address, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Linked Telegram chat id, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
    /// Registered webhook URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Administrator capability.
    #[serde(default)]
    pub admin: bool,
    /// Registration timestamp.
    pub created_at: Timestamp,
}

impl SubscriberProfile {
    /// Creates a new profile on the given plan.
    #[must_use]
    pub fn new(id: SubscriberId, plan: PlanTier) -> Self {
        Self {
            id,
            plan,
            email: None,
            telegram_chat_id: None,
            webhook_url: None,
            admin: false,
            created_at: Timestamp::now(),
        }
    }

    /// Sets the verified email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the Telegram chat id.
    #[must_use]
    pub fn with_telegram(mut self, chat_id: impl Into<String>) -> Self {
        self.telegram_chat_id = Some(chat_id.into());
        self
    }

    /// Sets the webhook URL.
    #[must_use]
    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Grants the administrator capability.
    #[must_use]
    pub fn as_admin(mut self) -> Self {
        self.admin = true;
        self
    }

    /// Returns the delivery address for an addressed channel, if one is
    /// on file. Non-addressed channels return `None`.
    #[must_use]
    pub fn address_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Telegram => self.telegram_chat_id.as_deref(),
            Channel::Webhook => self.webhook_url.as_deref(),
            _ => None,
        }
    }
}

/// Read access to subscriber profiles.
pub trait SubscriberDirectory: Send + Sync {
    /// Looks up a profile.
    fn profile(&self, id: &SubscriberId) -> Option<SubscriberProfile>;

    /// Returns the subscriber's plan tier; unknown subscribers default
    /// to the free tier.
    fn plan(&self, id: &SubscriberId) -> PlanTier {
        self.profile(id).map_or_else(PlanTier::default, |p| p.plan)
    }

    /// Returns true if the subscriber holds the admin capability.
    fn is_admin(&self, id: &SubscriberId) -> bool {
        self.profile(id).is_some_and(|p| p.admin)
    }
}

/// In-memory subscriber directory.
///
/// Process-wide state with explicit lifecycle: constructed at service
/// start and injected into the components that need it.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    profiles: DashMap<SubscriberId, SubscriberProfile>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a profile.
    pub fn upsert(&self, profile: SubscriberProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    /// Updates a subscriber's plan tier. Returns false if unknown.
    pub fn set_plan(&self, id: &SubscriberId, plan: PlanTier) -> bool {
        match self.profiles.get_mut(id) {
            Some(mut profile) => {
                profile.plan = plan;
                true
            }
            None => false,
        }
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl SubscriberDirectory for InMemoryDirectory {
    fn profile(&self, id: &SubscriberId) -> Option<SubscriberProfile> {
        self.profiles.get(id).map(|p| p.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscriber(id: &str) -> SubscriberId {
        SubscriberId::new_unchecked(id)
    }

    #[test]
    fn test_profile_address_lookup() {
        let profile = SubscriberProfile::new(subscriber("a@b.com"), PlanTier::Pro)
            .with_email("a@b.com")
            .with_telegram("12345");

        assert_eq!(profile.address_for(Channel::Email), Some("a@b.com"));
        assert_eq!(profile.address_for(Channel::Telegram), Some("12345"));
        assert_eq!(profile.address_for(Channel::Webhook), None);
        assert_eq!(profile.address_for(Channel::InApp), None);
    }

    #[test]
    fn test_directory_upsert_and_lookup() {
        let directory = InMemoryDirectory::new();
        directory.upsert(SubscriberProfile::new(subscriber("a@b.com"), PlanTier::Premium));

        assert_eq!(directory.plan(&subscriber("a@b.com")), PlanTier::Premium);
        assert!(directory.profile(&subscriber("unknown")).is_none());
    }

    #[test]
    fn test_unknown_subscriber_defaults_to_free() {
        let directory = InMemoryDirectory::new();
        assert_eq!(directory.plan(&subscriber("ghost")), PlanTier::Free);
        assert!(!directory.is_admin(&subscriber("ghost")));
    }

    #[test]
    fn test_set_plan() {
        let directory = InMemoryDirectory::new();
        directory.upsert(SubscriberProfile::new(subscriber("a@b.com"), PlanTier::Free));

        assert!(directory.set_plan(&subscriber("a@b.com"), PlanTier::Pro));
        assert_eq!(directory.plan(&subscriber("a@b.com")), PlanTier::Pro);
        assert!(!directory.set_plan(&subscriber("ghost"), PlanTier::Pro));
    }

    #[test]
    fn test_admin_capability() {
        let directory = InMemoryDirectory::new();
        directory.upsert(SubscriberProfile::new(subscriber("ops@b.com"), PlanTier::Free).as_admin());
        assert!(directory.is_admin(&subscriber("ops@b.com")));
    }
}
