//! Match engine: selects the subscriptions an event should notify.
//!
//! Matching is pure with respect to its inputs: the same event and the
//! same registry snapshot always produce the same match set, which is
//! what makes replay-after-crash safe. Evaluation of one subscription is
//! isolated from the others; a malformed subscription is logged and
//! skipped, never fatal to the batch.

use herald_core::event::SequencedEvent;
use herald_core::subscription::Subscription;
use tracing::warn;

/// Returns true if the subscription's filters accept the event.
///
/// A disabled subscription never matches. The confidence check passes
/// whenever the event carries no confidence value; the subscription
/// threshold only gates scored signals.
#[must_use]
pub fn matches(subscription: &Subscription, event: &SequencedEvent) -> bool {
    if !subscription.enabled {
        return false;
    }

    let config = &subscription.config;
    if !config.symbols.matches(&event.event.symbol) {
        return false;
    }
    if !config.strategy.matches(&event.event.strategy_id) {
        return false;
    }
    if !config.event_types.matches(event.event.event_type) {
        return false;
    }
    match event.confidence() {
        Some(confidence) => confidence >= config.min_confidence,
        None => true,
    }
}

/// Evaluates every subscription in the snapshot against one event.
///
/// Returns references to the matching subscriptions, in snapshot order.
/// Subscriptions whose stored config fails structural validation are
/// skipped with a warning; one bad row must not suppress the rest of the
/// batch.
#[must_use]
pub fn match_event<'a>(
    subscriptions: &'a [Subscription],
    event: &SequencedEvent,
) -> Vec<&'a Subscription> {
    subscriptions
        .iter()
        .filter(|subscription| {
            if let Err(e) = subscription.config.validate() {
                warn!(
                    subscription_id = %subscription.id,
                    error = %e,
                    "Skipping malformed subscription during matching"
                );
                return false;
            }
            matches(subscription, event)
        })
        .collect()
}
