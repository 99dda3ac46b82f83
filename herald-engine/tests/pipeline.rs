//! End-to-end pipeline tests: ingest through matching, dedup, quota,
//! dispatch, and polling.

use std::sync::Arc;

use herald_core::channel::Channel;
use herald_core::error::{RegistryError, SendError};
use herald_core::event::{Direction, EventPayload, EventType, StrategyEvent};
use herald_core::notification::DeliveryStatus;
use herald_core::plan::PlanTier;
use herald_core::subscriber::{InMemoryDirectory, SubscriberDirectory, SubscriberProfile};
use herald_core::subscription::SubscriptionConfig;
use herald_core::types::{
    Confidence, EventId, NotificationId, StrategyId, SubscriberId, Symbol,
};
use herald_engine::{
    Actor, AlertService, ChannelSender, InMemorySender, SenderRegistry, ServiceConfig,
};

fn subscriber(id: &str) -> SubscriberId {
    SubscriberId::new_unchecked(id)
}

fn event(symbol: &str, event_type: EventType, confidence: Option<u8>) -> StrategyEvent {
    let mut payload = EventPayload::new(Direction::Buy);
    payload.confidence = confidence.map(Confidence::new_unchecked);
    StrategyEvent::new(
        StrategyId::new_unchecked("trend-h1"),
        "Trend Following H1",
        Symbol::new_unchecked(symbol),
        event_type,
        payload,
    )
}

struct Harness {
    service: AlertService,
    email: Arc<InMemorySender>,
}

fn harness() -> Harness {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.upsert(
        SubscriberProfile::new(subscriber("trader@x.com"), PlanTier::Premium)
            .with_email("trader@x.com"),
    );
    directory.upsert(SubscriberProfile::new(subscriber("free@x.com"), PlanTier::Free));

    let email = Arc::new(InMemorySender::new(Channel::Email));
    let senders =
        SenderRegistry::new().with_sender(Arc::clone(&email) as Arc<dyn ChannelSender>);

    let service = AlertService::new(
        directory as Arc<dyn SubscriberDirectory>,
        senders,
        ServiceConfig::default(),
    );
    Harness { service, email }
}

async fn settled_delivery(
    harness: &Harness,
    id: NotificationId,
    channel: Channel,
) -> DeliveryStatus {
    // Dispatch runs on spawned tasks; wait for a terminal status.
    for _ in 0..200 {
        let status = harness
            .service
            .store()
            .get(id)
            .and_then(|n| n.delivery.get(&channel).map(|d| d.status));
        if let Some(status) = status {
            if status.is_terminal() {
                return status;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("delivery for {channel} never settled");
}

#[tokio::test]
async fn replayed_event_produces_exactly_one_notification() {
    let h = harness();
    let owner = subscriber("trader@x.com");
    h.service
        .registry()
        .create(
            &Actor::subscriber(owner.clone()),
            &owner,
            SubscriptionConfig::all_events([Channel::InApp]),
        )
        .unwrap();

    h.service.ingest(event("EURUSD", EventType::Signal, None)).await;

    // Crash recovery re-delivers the whole log twice over.
    h.service.replay_since(EventId::ZERO);
    h.service.replay_since(EventId::ZERO);

    let page = h.service.store().sync(&owner, NotificationId::ZERO, 100);
    assert_eq!(page.notifications.len(), 1);
    assert_eq!(h.service.stats().notifications_created, 1);
}

#[tokio::test]
async fn unread_count_tracks_transitions_exactly() {
    let h = harness();
    let owner = subscriber("trader@x.com");
    h.service
        .registry()
        .create(
            &Actor::subscriber(owner.clone()),
            &owner,
            SubscriptionConfig::all_events([Channel::InApp]),
        )
        .unwrap();

    for symbol in ["EURUSD", "XAUUSD", "US30"] {
        h.service.ingest(event(symbol, EventType::Signal, None)).await;
    }
    let store = h.service.store();
    assert_eq!(store.unread_count(&owner), 3);

    let first = store.sync(&owner, NotificationId::ZERO, 1).notifications[0].id;
    store.mark_read(&owner, first).unwrap();
    assert_eq!(store.unread_count(&owner), 2);

    store.mark_all_read(&owner);
    assert_eq!(store.unread_count(&owner), 0);

    h.service.ingest(event("USOIL", EventType::Signal, None)).await;
    assert_eq!(store.unread_count(&owner), 1);

    store.clear(&owner);
    assert_eq!(store.unread_count(&owner), 0);

    // Counter equals a full scan after every transition.
    let scan = store
        .sync(&owner, NotificationId::ZERO, 1000)
        .notifications
        .iter()
        .filter(|n| !n.read)
        .count();
    assert_eq!(scan, 0);
}

#[tokio::test]
async fn polling_is_prefix_consistent() {
    let h = harness();
    let owner = subscriber("trader@x.com");
    h.service
        .registry()
        .create(
            &Actor::subscriber(owner.clone()),
            &owner,
            SubscriptionConfig::all_events([Channel::InApp]),
        )
        .unwrap();

    for i in 0..10 {
        h.service
            .ingest(event(&format!("SYM{i}"), EventType::Signal, None))
            .await;
    }

    let store = h.service.store();
    let full = store.sync(&owner, NotificationId::ZERO, 1000);

    // Two clients with different cursors see disjoint pages whose union
    // is the full suffix.
    let c1 = store.sync(&owner, NotificationId::ZERO, 4);
    let c2 = store.sync(&owner, c1.last_id, 1000);

    let ids1: Vec<u64> = c1.notifications.iter().map(|n| n.id.as_u64()).collect();
    let ids2: Vec<u64> = c2.notifications.iter().map(|n| n.id.as_u64()).collect();
    assert!(ids1.iter().all(|id| !ids2.contains(id)));

    let mut union = [ids1, ids2].concat();
    union.sort_unstable();
    let all: Vec<u64> = full.notifications.iter().map(|n| n.id.as_u64()).collect();
    assert_eq!(union, all);

    // An unchanged cursor returns an empty, stable page.
    let caught_up = store.sync(&owner, full.last_id, 1000);
    assert!(caught_up.notifications.is_empty());
    assert_eq!(caught_up.last_id, full.last_id);
}

#[tokio::test]
async fn symbol_scope_never_leaks_other_symbols() {
    let h = harness();
    let owner = subscriber("trader@x.com");
    h.service
        .registry()
        .create(
            &Actor::subscriber(owner.clone()),
            &owner,
            SubscriptionConfig::all_events([Channel::InApp])
                .with_symbols([Symbol::new_unchecked("EURUSD")]),
        )
        .unwrap();

    h.service.ingest(event("GBPUSD", EventType::Signal, None)).await;
    assert_eq!(h.service.store().unread_count(&owner), 0);

    h.service.ingest(event("EURUSD", EventType::Signal, None)).await;
    assert_eq!(h.service.store().unread_count(&owner), 1);
}

#[tokio::test]
async fn third_subscription_on_free_plan_is_rejected() {
    let h = harness();
    let owner = subscriber("free@x.com");
    let actor = Actor::subscriber(owner.clone());
    let config = SubscriptionConfig::all_events([Channel::InApp]);

    h.service.registry().create(&actor, &owner, config.clone()).unwrap();
    h.service.registry().create(&actor, &owner, config.clone()).unwrap();

    let err = h.service.registry().create(&actor, &owner, config).unwrap_err();
    assert_eq!(err, RegistryError::QuotaExceeded { limit: 2 });
    assert_eq!(h.service.registry().enabled_count(&owner), 2);
}

#[tokio::test]
async fn confidence_threshold_selects_exactly_one_subscription() {
    let h = harness();
    let owner = subscriber("trader@x.com");
    let actor = Actor::subscriber(owner.clone());

    // A: wildcard symbols, accepts near_sl, threshold 60.
    let a = h
        .service
        .registry()
        .create(
            &actor,
            &owner,
            SubscriptionConfig::all_events([Channel::InApp])
                .with_event_types([EventType::NearSl])
                .with_min_confidence(Confidence::new_unchecked(60)),
        )
        .unwrap();

    // B: XAUUSD only, threshold 80 — rejects a 72.
    h.service
        .registry()
        .create(
            &actor,
            &owner,
            SubscriptionConfig::all_events([Channel::InApp])
                .with_symbols([Symbol::new_unchecked("XAUUSD")])
                .with_min_confidence(Confidence::new_unchecked(80)),
        )
        .unwrap();

    h.service
        .ingest(event("XAUUSD", EventType::NearSl, Some(72)))
        .await;

    let page = h.service.store().sync(&owner, NotificationId::ZERO, 100);
    assert_eq!(page.notifications.len(), 1);
    assert_eq!(page.notifications[0].subscription_id, a.id);
}

#[tokio::test]
async fn disabled_subscription_ignores_historical_replay() {
    let h = harness();
    let owner = subscriber("trader@x.com");
    let actor = Actor::subscriber(owner.clone());

    let sub = h
        .service
        .registry()
        .create(
            &actor,
            &owner,
            SubscriptionConfig::all_events([Channel::InApp]),
        )
        .unwrap();

    h.service.ingest(event("EURUSD", EventType::Signal, None)).await;
    h.service.store().clear(&owner);
    h.service.registry().disable(&actor, sub.id).unwrap();

    // Re-process history that previously matched the subscription.
    h.service.replay_since(EventId::ZERO);

    let page = h.service.store().sync(&owner, NotificationId::ZERO, 100);
    assert!(page.notifications.is_empty());
    assert_eq!(h.service.stats().notifications_created, 1);
}

#[tokio::test]
async fn failed_email_leaves_notification_visible_with_status() {
    let h = harness();
    let owner = subscriber("trader@x.com");
    h.email
        .fail_with(SendError::Permanent("mailbox rejected".into()));

    h.service
        .registry()
        .create(
            &Actor::subscriber(owner.clone()),
            &owner,
            SubscriptionConfig::all_events([Channel::InApp, Channel::Email]),
        )
        .unwrap();

    h.service.ingest(event("EURUSD", EventType::Signal, None)).await;

    let page = h.service.store().sync(&owner, NotificationId::ZERO, 100);
    assert_eq!(page.notifications.len(), 1);
    let id = page.notifications[0].id;

    assert_eq!(
        settled_delivery(&h, id, Channel::Email).await,
        DeliveryStatus::Failed
    );
    assert_eq!(
        settled_delivery(&h, id, Channel::InApp).await,
        DeliveryStatus::Delivered
    );

    // Still visible, still unread: delivery failure never removes the
    // notification from the store.
    let again = h.service.store().sync(&owner, NotificationId::ZERO, 100);
    assert_eq!(again.notifications.len(), 1);
    assert!(!again.notifications[0].read);
}
