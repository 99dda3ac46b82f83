//! Quota policy: tier presets plus per-subscriber admin overrides.

use dashmap::DashMap;

use herald_core::plan::{PlanQuota, PlanTier};
use herald_core::types::SubscriberId;
use tracing::info;

/// Resolves the effective quota for a subscriber.
///
/// The effective quota is the per-subscriber override when an
/// administrator has granted one (gift/extend), otherwise the preset for
/// the subscriber's plan tier.
#[derive(Debug, Default)]
pub struct QuotaPolicy {
    overrides: DashMap<SubscriberId, PlanQuota>,
}

impl QuotaPolicy {
    /// Creates a policy with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the effective quota for a subscriber on the given tier.
    #[must_use]
    pub fn effective(&self, subscriber: &SubscriberId, tier: PlanTier) -> PlanQuota {
        self.overrides
            .get(subscriber)
            .map_or_else(|| PlanQuota::for_tier(tier), |q| q.clone())
    }

    /// Installs a per-subscriber override.
    pub fn set_override(&self, subscriber: SubscriberId, quota: PlanQuota) {
        info!(%subscriber, "Quota override installed");
        self.overrides.insert(subscriber, quota);
    }

    /// Removes a per-subscriber override. Returns true if one existed.
    pub fn clear_override(&self, subscriber: &SubscriberId) -> bool {
        let removed = self.overrides.remove(subscriber).is_some();
        if removed {
            info!(%subscriber, "Quota override removed");
        }
        removed
    }

    /// Returns the override for a subscriber, if any.
    #[must_use]
    pub fn override_for(&self, subscriber: &SubscriberId) -> Option<PlanQuota> {
        self.overrides.get(subscriber).map(|q| q.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::channel::Channel;

    fn subscriber(id: &str) -> SubscriberId {
        SubscriberId::new_unchecked(id)
    }

    #[test]
    fn test_effective_falls_back_to_tier_preset() {
        let policy = QuotaPolicy::new();
        let quota = policy.effective(&subscriber("a@b.com"), PlanTier::Free);
        assert_eq!(quota, PlanQuota::free_tier());
    }

    #[test]
    fn test_override_wins_over_tier() {
        let policy = QuotaPolicy::new();
        let gifted = PlanQuota::free_tier().with_max_subscriptions(10);
        policy.set_override(subscriber("a@b.com"), gifted.clone());

        let quota = policy.effective(&subscriber("a@b.com"), PlanTier::Free);
        assert_eq!(quota, gifted);

        // Other subscribers keep the preset.
        let other = policy.effective(&subscriber("c@d.com"), PlanTier::Free);
        assert_eq!(other, PlanQuota::free_tier());
    }

    #[test]
    fn test_clear_override() {
        let policy = QuotaPolicy::new();
        policy.set_override(
            subscriber("a@b.com"),
            PlanQuota::free_tier().with_channel(Channel::Email),
        );

        assert!(policy.clear_override(&subscriber("a@b.com")));
        assert!(!policy.clear_override(&subscriber("a@b.com")));
        assert_eq!(
            policy.effective(&subscriber("a@b.com"), PlanTier::Free),
            PlanQuota::free_tier()
        );
    }
}
