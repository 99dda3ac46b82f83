//! Subscription registry: CRUD over subscriber filter configurations,
//! validated against plan-tier channel and quota policy.
//!
//! Mutations re-validate against the owner's *current* plan, so a plan
//! downgrade is not retroactive: existing subscriptions keep working
//! until the next mutation touches them.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use herald_core::error::RegistryError;
use herald_core::subscriber::SubscriberDirectory;
use herald_core::subscription::{Subscription, SubscriptionConfig};
use herald_core::types::{SubscriberId, SubscriptionId, Timestamp};
use tracing::{debug, info};

use crate::policy::QuotaPolicy;

/// The identity performing a registry operation.
///
/// Administrators may mutate any subscriber's subscriptions and assign
/// the broadcast channel; regular subscribers may only touch their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Acting subscriber.
    pub id: SubscriberId,
    /// Administrator capability.
    pub admin: bool,
}

impl Actor {
    /// A regular subscriber actor.
    #[must_use]
    pub fn subscriber(id: SubscriberId) -> Self {
        Self { id, admin: false }
    }

    /// An administrator actor.
    #[must_use]
    pub fn admin(id: SubscriberId) -> Self {
        Self { id, admin: true }
    }

    fn may_act_for(&self, owner: &SubscriberId) -> bool {
        self.admin || &self.id == owner
    }
}

/// Registry of subscription filter configurations.
pub struct SubscriptionRegistry {
    subscriptions: DashMap<SubscriptionId, Subscription>,
    by_owner: DashMap<SubscriberId, Vec<SubscriptionId>>,
    next_id: AtomicU64,
    policy: Arc<QuotaPolicy>,
    directory: Arc<dyn SubscriberDirectory>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(policy: Arc<QuotaPolicy>, directory: Arc<dyn SubscriberDirectory>) -> Self {
        Self {
            subscriptions: DashMap::new(),
            by_owner: DashMap::new(),
            next_id: AtomicU64::new(1),
            policy,
            directory,
        }
    }

    /// Creates a subscription for `owner`.
    ///
    /// Validation order: actor capability, structural config validity,
    /// broadcast capability, channel-set inclusion in the owner's
    /// effective quota, then the enabled-subscription ceiling.
    pub fn create(
        &self,
        actor: &Actor,
        owner: &SubscriberId,
        config: SubscriptionConfig,
    ) -> Result<Subscription, RegistryError> {
        if !actor.may_act_for(owner) {
            return Err(RegistryError::Forbidden(
                "cannot create subscriptions for another subscriber".to_string(),
            ));
        }
        self.validate_config(actor, owner, &config)?;

        let quota = self
            .policy
            .effective(owner, self.directory.plan(owner));
        let enabled = self.enabled_count(owner);
        if enabled >= quota.max_enabled_subscriptions as usize {
            return Err(RegistryError::QuotaExceeded {
                limit: quota.max_enabled_subscriptions,
            });
        }

        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let now = Timestamp::now();
        let subscription = Subscription {
            id,
            owner: owner.clone(),
            config,
            enabled: true,
            created_at: now,
            updated_at: now,
            alerts_sent: 0,
        };

        self.subscriptions.insert(id, subscription.clone());
        self.by_owner.entry(owner.clone()).or_default().push(id);

        info!(subscription_id = %id, %owner, "Subscription created");
        Ok(subscription)
    }

    /// Replaces the configuration of an existing subscription.
    ///
    /// Re-validates against the owner's current plan; this is where a
    /// plan downgrade catches up with an over-privileged config.
    pub fn update(
        &self,
        actor: &Actor,
        id: SubscriptionId,
        config: SubscriptionConfig,
    ) -> Result<Subscription, RegistryError> {
        let owner = self.owner_of(id)?;
        if !actor.may_act_for(&owner) {
            return Err(RegistryError::Forbidden(
                "cannot update another subscriber's subscription".to_string(),
            ));
        }
        self.validate_config(actor, &owner, &config)?;

        let mut entry = self
            .subscriptions
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        entry.config = config;
        entry.updated_at = Timestamp::now();
        debug!(subscription_id = %id, "Subscription updated");
        Ok(entry.clone())
    }

    /// Disables a subscription.
    ///
    /// Takes effect for all events sequenced after this call; matches
    /// already recorded complete their dispatch normally.
    pub fn disable(&self, actor: &Actor, id: SubscriptionId) -> Result<(), RegistryError> {
        let owner = self.owner_of(id)?;
        if !actor.may_act_for(&owner) {
            return Err(RegistryError::Forbidden(
                "cannot disable another subscriber's subscription".to_string(),
            ));
        }

        let mut entry = self
            .subscriptions
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        if entry.enabled {
            entry.enabled = false;
            entry.updated_at = Timestamp::now();
            info!(subscription_id = %id, %owner, "Subscription disabled");
        }
        Ok(())
    }

    /// Lists a subscriber's subscriptions, id order, disabled included.
    #[must_use]
    pub fn list(&self, owner: &SubscriberId) -> Vec<Subscription> {
        let Some(ids) = self.by_owner.get(owner) else {
            return Vec::new();
        };
        let mut subs: Vec<Subscription> = ids
            .iter()
            .filter_map(|id| self.subscriptions.get(id).map(|s| s.clone()))
            .collect();
        subs.sort_by_key(|s| s.id);
        subs
    }

    /// Returns a subscription by id.
    #[must_use]
    pub fn get(&self, id: SubscriptionId) -> Option<Subscription> {
        self.subscriptions.get(&id).map(|s| s.clone())
    }

    /// Snapshot of every enabled subscription, for the match engine.
    #[must_use]
    pub fn enabled_snapshot(&self) -> Vec<Subscription> {
        self.subscriptions
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.clone())
            .collect()
    }

    /// Number of enabled subscriptions for a subscriber.
    #[must_use]
    pub fn enabled_count(&self, owner: &SubscriberId) -> usize {
        self.by_owner.get(owner).map_or(0, |ids| {
            ids.iter()
                .filter(|id| self.subscriptions.get(*id).is_some_and(|s| s.enabled))
                .count()
        })
    }

    /// Total number of subscriptions, disabled included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Bumps the delivered-alert counter after a notification is
    /// recorded for this subscription.
    pub fn record_alert(&self, id: SubscriptionId) {
        if let Some(mut entry) = self.subscriptions.get_mut(&id) {
            entry.alerts_sent += 1;
        }
    }

    fn owner_of(&self, id: SubscriptionId) -> Result<SubscriberId, RegistryError> {
        self.subscriptions
            .get(&id)
            .map(|s| s.owner.clone())
            .ok_or(RegistryError::NotFound(id))
    }

    /// Shared validation for create and update.
    ///
    /// The broadcast capability check comes before any quota lookup:
    /// assigning the operator feed is a permission question, not a plan
    /// question.
    fn validate_config(
        &self,
        actor: &Actor,
        owner: &SubscriberId,
        config: &SubscriptionConfig,
    ) -> Result<(), RegistryError> {
        config.validate()?;

        let wants_broadcast = config.channels.iter().any(|c| c.is_broadcast());
        if wants_broadcast && !actor.admin {
            return Err(RegistryError::Forbidden(
                "the broadcast channel is assignable only by an administrator".to_string(),
            ));
        }

        let quota = self
            .policy
            .effective(owner, self.directory.plan(owner));
        if let Some(&channel) = config
            .channels
            .iter()
            .find(|c| !c.is_broadcast() && !quota.allows_channel(**c))
        {
            return Err(RegistryError::ChannelNotAllowed(channel));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::channel::Channel;
    use herald_core::plan::{PlanQuota, PlanTier};
    use herald_core::subscriber::{InMemoryDirectory, SubscriberProfile};

    fn subscriber(id: &str) -> SubscriberId {
        SubscriberId::new_unchecked(id)
    }

    fn setup() -> (SubscriptionRegistry, Arc<InMemoryDirectory>, Arc<QuotaPolicy>) {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.upsert(SubscriberProfile::new(subscriber("free@x.com"), PlanTier::Free));
        directory.upsert(SubscriberProfile::new(subscriber("pro@x.com"), PlanTier::Pro));
        directory.upsert(
            SubscriberProfile::new(subscriber("ops@x.com"), PlanTier::Enterprise).as_admin(),
        );
        let policy = Arc::new(QuotaPolicy::new());
        let registry = SubscriptionRegistry::new(
            Arc::clone(&policy),
            Arc::clone(&directory) as Arc<dyn SubscriberDirectory>,
        );
        (registry, directory, policy)
    }

    fn in_app() -> SubscriptionConfig {
        SubscriptionConfig::all_events([Channel::InApp])
    }

    #[test]
    fn test_create_and_list() {
        let (registry, _, _) = setup();
        let owner = subscriber("free@x.com");
        let actor = Actor::subscriber(owner.clone());

        let sub = registry.create(&actor, &owner, in_app()).unwrap();
        assert!(sub.enabled);
        assert_eq!(sub.id.as_u64(), 1);

        let listed = registry.list(&owner);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, sub.id);
    }

    #[test]
    fn test_quota_ceiling_leaves_existing_intact() {
        let (registry, _, _) = setup();
        let owner = subscriber("free@x.com");
        let actor = Actor::subscriber(owner.clone());

        // Free tier allows 2 enabled subscriptions.
        registry.create(&actor, &owner, in_app()).unwrap();
        registry.create(&actor, &owner, in_app()).unwrap();

        let err = registry.create(&actor, &owner, in_app()).unwrap_err();
        assert_eq!(err, RegistryError::QuotaExceeded { limit: 2 });
        assert_eq!(registry.enabled_count(&owner), 2);
    }

    #[test]
    fn test_disable_frees_quota() {
        let (registry, _, _) = setup();
        let owner = subscriber("free@x.com");
        let actor = Actor::subscriber(owner.clone());

        let a = registry.create(&actor, &owner, in_app()).unwrap();
        registry.create(&actor, &owner, in_app()).unwrap();
        registry.disable(&actor, a.id).unwrap();

        assert_eq!(registry.enabled_count(&owner), 1);
        assert!(registry.create(&actor, &owner, in_app()).is_ok());
    }

    #[test]
    fn test_channel_not_allowed_names_channel() {
        let (registry, _, _) = setup();
        let owner = subscriber("free@x.com");
        let actor = Actor::subscriber(owner.clone());

        let config = SubscriptionConfig::all_events([Channel::InApp, Channel::Email]);
        let err = registry.create(&actor, &owner, config).unwrap_err();
        assert_eq!(err, RegistryError::ChannelNotAllowed(Channel::Email));
    }

    #[test]
    fn test_pro_plan_allows_email() {
        let (registry, _, _) = setup();
        let owner = subscriber("pro@x.com");
        let actor = Actor::subscriber(owner.clone());

        let config = SubscriptionConfig::all_events([Channel::InApp, Channel::Email]);
        assert!(registry.create(&actor, &owner, config).is_ok());
    }

    #[test]
    fn test_broadcast_forbidden_for_subscribers() {
        let (registry, _, _) = setup();
        let owner = subscriber("pro@x.com");
        let actor = Actor::subscriber(owner.clone());

        let config = SubscriptionConfig::all_events([Channel::Broadcast]);
        let err = registry.create(&actor, &owner, config).unwrap_err();
        assert!(matches!(err, RegistryError::Forbidden(_)));
    }

    #[test]
    fn test_broadcast_assignable_by_admin() {
        let (registry, _, _) = setup();
        let owner = subscriber("pro@x.com");
        let admin = Actor::admin(subscriber("ops@x.com"));

        let config = SubscriptionConfig::all_events([Channel::Broadcast]);
        assert!(registry.create(&admin, &owner, config).is_ok());
    }

    #[test]
    fn test_foreign_mutation_forbidden() {
        let (registry, _, _) = setup();
        let owner = subscriber("free@x.com");
        let sub = registry
            .create(&Actor::subscriber(owner.clone()), &owner, in_app())
            .unwrap();

        let intruder = Actor::subscriber(subscriber("pro@x.com"));
        assert!(matches!(
            registry.disable(&intruder, sub.id),
            Err(RegistryError::Forbidden(_))
        ));
        assert!(matches!(
            registry.update(&intruder, sub.id, in_app()),
            Err(RegistryError::Forbidden(_))
        ));
    }

    #[test]
    fn test_update_revalidates_against_current_plan() {
        let (registry, directory, _) = setup();
        let owner = subscriber("pro@x.com");
        let actor = Actor::subscriber(owner.clone());

        let config = SubscriptionConfig::all_events([Channel::Email]);
        let sub = registry.create(&actor, &owner, config.clone()).unwrap();

        // Downgrade does not retroactively revoke...
        directory.set_plan(&owner, PlanTier::Free);
        assert!(registry.get(sub.id).unwrap().enabled);

        // ...but the next mutation re-validates.
        let err = registry.update(&actor, sub.id, config).unwrap_err();
        assert_eq!(err, RegistryError::ChannelNotAllowed(Channel::Email));
    }

    #[test]
    fn test_update_unknown_id() {
        let (registry, _, _) = setup();
        let actor = Actor::subscriber(subscriber("free@x.com"));
        assert!(matches!(
            registry.update(&actor, SubscriptionId::new(99), in_app()),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (registry, _, _) = setup();
        let owner = subscriber("free@x.com");
        let actor = Actor::subscriber(owner.clone());

        let config = SubscriptionConfig::all_events([Channel::InApp]).with_symbols([]);
        assert!(matches!(
            registry.create(&actor, &owner, config),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_quota_override_extends_ceiling() {
        let (registry, _, policy) = setup();
        let owner = subscriber("free@x.com");
        let actor = Actor::subscriber(owner.clone());

        policy.set_override(owner.clone(), PlanQuota::free_tier().with_max_subscriptions(3));

        registry.create(&actor, &owner, in_app()).unwrap();
        registry.create(&actor, &owner, in_app()).unwrap();
        assert!(registry.create(&actor, &owner, in_app()).is_ok());
        assert!(matches!(
            registry.create(&actor, &owner, in_app()),
            Err(RegistryError::QuotaExceeded { limit: 3 })
        ));
    }

    #[test]
    fn test_enabled_snapshot_excludes_disabled() {
        let (registry, _, _) = setup();
        let owner = subscriber("free@x.com");
        let actor = Actor::subscriber(owner.clone());

        let a = registry.create(&actor, &owner, in_app()).unwrap();
        registry.create(&actor, &owner, in_app()).unwrap();
        registry.disable(&actor, a.id).unwrap();

        let snapshot = registry.enabled_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_ne!(snapshot[0].id, a.id);
    }
}
