//! Plan tiers and quota presets.
//!
//! Plans are configured by an external plan/billing collaborator; the
//! core only consumes the limits. Quotas bound the number of
//! concurrently enabled subscriptions, the notification creation rate,
//! and the channel set a subscriber may request.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::channel::Channel;

/// Subscriber plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free tier.
    #[default]
    Free,
    /// Pro tier.
    Pro,
    /// Premium tier.
    Premium,
    /// Enterprise tier.
    Enterprise,
}

impl PlanTier {
    /// All tiers, cheapest first.
    pub const ALL: [Self; 4] = [Self::Free, Self::Pro, Self::Premium, Self::Enterprise];

    /// Returns the tier name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-plan quota limits consumed by the registry and rate limiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanQuota {
    /// Maximum concurrently enabled subscriptions.
    pub max_enabled_subscriptions: u32,
    /// Maximum notifications created per subscriber per rolling hour.
    pub max_notifications_per_hour: u32,
    /// Channels a subscriber on this plan may request.
    ///
    /// `broadcast` is never in a plan's set; it is granted only through
    /// the admin capability path.
    pub allowed_channels: HashSet<Channel>,
}

impl PlanQuota {
    /// Free tier: in-app surfaces only, two subscriptions.
    #[must_use]
    pub fn free_tier() -> Self {
        Self {
            max_enabled_subscriptions: 2,
            max_notifications_per_hour: 20,
            allowed_channels: [Channel::InApp, Channel::Popup, Channel::Sound]
                .into_iter()
                .collect(),
        }
    }

    /// Pro tier: adds desktop push and email.
    #[must_use]
    pub fn pro_tier() -> Self {
        Self {
            max_enabled_subscriptions: 15,
            max_notifications_per_hour: 100,
            allowed_channels: [
                Channel::InApp,
                Channel::Popup,
                Channel::Sound,
                Channel::Desktop,
                Channel::Email,
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Premium tier: adds the chat bot and webhooks.
    #[must_use]
    pub fn premium_tier() -> Self {
        Self {
            max_enabled_subscriptions: 50,
            max_notifications_per_hour: 500,
            allowed_channels: [
                Channel::InApp,
                Channel::Popup,
                Channel::Sound,
                Channel::Desktop,
                Channel::Email,
                Channel::Telegram,
                Channel::Webhook,
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Enterprise tier: every subscriber-assignable channel.
    #[must_use]
    pub fn enterprise_tier() -> Self {
        Self {
            max_enabled_subscriptions: 500,
            max_notifications_per_hour: 2000,
            allowed_channels: Channel::ALL
                .into_iter()
                .filter(|c| !c.is_broadcast())
                .collect(),
        }
    }

    /// Returns the preset quota for a tier.
    #[must_use]
    pub fn for_tier(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Free => Self::free_tier(),
            PlanTier::Pro => Self::pro_tier(),
            PlanTier::Premium => Self::premium_tier(),
            PlanTier::Enterprise => Self::enterprise_tier(),
        }
    }

    /// Returns true if the plan allows the given channel.
    #[must_use]
    pub fn allows_channel(&self, channel: Channel) -> bool {
        self.allowed_channels.contains(&channel)
    }

    /// Adds a channel to the allowed set (admin override path).
    #[must_use]
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.allowed_channels.insert(channel);
        self
    }

    /// Sets the enabled-subscription ceiling (admin override path).
    #[must_use]
    pub fn with_max_subscriptions(mut self, max: u32) -> Self {
        self.max_enabled_subscriptions = max;
        self
    }

    /// Sets the hourly notification ceiling (admin override path).
    #[must_use]
    pub fn with_max_per_hour(mut self, max: u32) -> Self {
        self.max_notifications_per_hour = max;
        self
    }
}

impl Default for PlanQuota {
    fn default() -> Self {
        Self::free_tier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_widen_monotonically() {
        let free = PlanQuota::free_tier();
        let pro = PlanQuota::pro_tier();
        let premium = PlanQuota::premium_tier();
        let enterprise = PlanQuota::enterprise_tier();

        assert!(free.max_enabled_subscriptions < pro.max_enabled_subscriptions);
        assert!(pro.max_enabled_subscriptions < premium.max_enabled_subscriptions);
        assert!(premium.max_enabled_subscriptions < enterprise.max_enabled_subscriptions);

        assert!(free.allowed_channels.is_subset(&pro.allowed_channels));
        assert!(pro.allowed_channels.is_subset(&premium.allowed_channels));
        assert!(premium.allowed_channels.is_subset(&enterprise.allowed_channels));
    }

    #[test]
    fn test_free_tier_has_no_durable_channels() {
        let free = PlanQuota::free_tier();
        assert!(free.allows_channel(Channel::InApp));
        assert!(!free.allows_channel(Channel::Email));
        assert!(!free.allows_channel(Channel::Telegram));
    }

    #[test]
    fn test_telegram_gated_to_premium() {
        assert!(!PlanQuota::pro_tier().allows_channel(Channel::Telegram));
        assert!(PlanQuota::premium_tier().allows_channel(Channel::Telegram));
    }

    #[test]
    fn test_no_tier_allows_broadcast() {
        for tier in PlanTier::ALL {
            assert!(
                !PlanQuota::for_tier(tier).allows_channel(Channel::Broadcast),
                "tier {tier} must not allow broadcast"
            );
        }
    }

    #[test]
    fn test_admin_override_builders() {
        let quota = PlanQuota::free_tier()
            .with_channel(Channel::Broadcast)
            .with_max_subscriptions(10)
            .with_max_per_hour(999);
        assert!(quota.allows_channel(Channel::Broadcast));
        assert_eq!(quota.max_enabled_subscriptions, 10);
        assert_eq!(quota.max_notifications_per_hour, 999);
    }

    #[test]
    fn test_plan_tier_serde() {
        assert_eq!(
            serde_json::to_string(&PlanTier::Premium).unwrap(),
            "\"premium\""
        );
        let parsed: PlanTier = serde_json::from_str("\"enterprise\"").unwrap();
        assert_eq!(parsed, PlanTier::Enterprise);
    }
}
