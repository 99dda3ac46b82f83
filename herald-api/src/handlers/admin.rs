//! Administrator handlers.
//!
//! Privileged variants of the subscription operations plus subscriber
//! registration, plan changes, and quota overrides. Consumed by the
//! external admin-panel and billing collaborators; every handler checks
//! the admin capability first.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use herald_core::channel::Channel;
use herald_core::plan::{PlanQuota, PlanTier};
use herald_core::subscriber::{SubscriberDirectory, SubscriberProfile};
use herald_core::subscription::{Subscription, SubscriptionConfig};
use herald_core::types::SubscriberId;
use herald_engine::ServiceStats;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{Auth, AuthenticatedSubscriber};
use crate::response::{ApiResponse, CreatedResponse};
use crate::state::AppState;

fn require_admin(user: &AuthenticatedSubscriber) -> ApiResult<()> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin access required".to_string()))
    }
}

fn parse_subscriber(id: &str) -> ApiResult<SubscriberId> {
    SubscriberId::new(id).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Register-or-update request for a subscriber profile.
#[derive(Debug, Deserialize)]
pub struct UpsertSubscriberRequest {
    /// Plan tier (set by the billing collaborator).
    #[serde(default)]
    pub plan: PlanTier,
    /// Verified email address.
    pub email: Option<String>,
    /// Linked Telegram chat id.
    pub telegram_chat_id: Option<String>,
    /// Registered webhook URL.
    pub webhook_url: Option<String>,
    /// Administrator capability.
    #[serde(default)]
    pub admin: bool,
}

/// Register or update a subscriber profile.
///
/// PUT /api/v1/admin/subscribers/{id}
pub async fn upsert_subscriber(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Path(id): Path<String>,
    Json(request): Json<UpsertSubscriberRequest>,
) -> ApiResult<ApiResponse<SubscriberProfile>> {
    require_admin(&user)?;
    let id = parse_subscriber(&id)?;

    // Subscribers are never hard-deleted; re-registration keeps the
    // original creation time.
    let mut profile = state
        .directory
        .profile(&id)
        .unwrap_or_else(|| SubscriberProfile::new(id.clone(), request.plan));
    profile.plan = request.plan;
    profile.email = request.email;
    profile.telegram_chat_id = request.telegram_chat_id;
    profile.webhook_url = request.webhook_url;
    profile.admin = request.admin;

    state.directory.upsert(profile.clone());
    Ok(ApiResponse::success_with_message(
        profile,
        "Subscriber profile saved",
    ))
}

/// Quota override request (gift/extend).
#[derive(Debug, Deserialize)]
pub struct QuotaOverrideRequest {
    /// Override for the enabled-subscription ceiling.
    pub max_enabled_subscriptions: Option<u32>,
    /// Override for the hourly notification ceiling.
    pub max_notifications_per_hour: Option<u32>,
    /// Extra channels granted beyond the plan set.
    #[serde(default)]
    pub extra_channels: Vec<Channel>,
    /// Remove any existing override instead of installing one.
    #[serde(default)]
    pub reset: bool,
}

/// Install or remove a per-subscriber quota override.
///
/// PUT /api/v1/admin/subscribers/{id}/quota
pub async fn update_quota(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Path(id): Path<String>,
    Json(request): Json<QuotaOverrideRequest>,
) -> ApiResult<ApiResponse<PlanQuota>> {
    require_admin(&user)?;
    let id = parse_subscriber(&id)?;

    let policy = state.service.policy();
    if request.reset {
        policy.clear_override(&id);
        let effective = policy.effective(&id, state.directory.plan(&id));
        return Ok(ApiResponse::success_with_message(
            effective,
            "Quota override removed",
        ));
    }

    // Start from the subscriber's plan preset and apply the grants.
    let mut quota = policy.effective(&id, state.directory.plan(&id));
    if let Some(max) = request.max_enabled_subscriptions {
        quota = quota.with_max_subscriptions(max);
    }
    if let Some(max) = request.max_notifications_per_hour {
        quota = quota.with_max_per_hour(max);
    }
    for channel in request.extra_channels {
        quota = quota.with_channel(channel);
    }

    policy.set_override(id, quota.clone());
    Ok(ApiResponse::success_with_message(
        quota,
        "Quota override installed",
    ))
}

/// Create a subscription on behalf of a subscriber.
///
/// POST /api/v1/admin/subscribers/{id}/subscriptions
///
/// This is the only path that may assign the broadcast channel.
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Path(id): Path<String>,
    Json(config): Json<SubscriptionConfig>,
) -> ApiResult<CreatedResponse<Subscription>> {
    require_admin(&user)?;
    let owner = parse_subscriber(&id)?;

    let subscription = state
        .service
        .registry()
        .create(&user.actor(), &owner, config)?;
    Ok(CreatedResponse::new(subscription))
}

/// Engine counter snapshot.
///
/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
) -> ApiResult<ApiResponse<ServiceStats>> {
    require_admin(&user)?;
    Ok(ApiResponse::success(state.service.stats()))
}
