//! Subscription CRUD handlers.
//!
//! The request body for create/update is the validated
//! `SubscriptionConfig` record itself: unknown fields are rejected at
//! deserialization, policy violations surface as typed errors from the
//! registry.

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use herald_core::subscription::{Subscription, SubscriptionConfig};
use herald_core::types::SubscriptionId;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::response::{ApiResponse, CreatedResponse, EmptyResponse};
use crate::state::AppState;

/// List the caller's subscriptions, disabled included.
///
/// GET /api/v1/subscriptions
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
) -> ApiResult<ApiResponse<Vec<Subscription>>> {
    let subscriptions = state.service.registry().list(&user.id);
    Ok(ApiResponse::success(subscriptions))
}

/// Create a subscription for the caller.
///
/// POST /api/v1/subscriptions
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Json(config): Json<SubscriptionConfig>,
) -> ApiResult<CreatedResponse<Subscription>> {
    let subscription = state
        .service
        .registry()
        .create(&user.actor(), &user.id, config)?;
    Ok(CreatedResponse::new(subscription))
}

/// Replace a subscription's configuration.
///
/// PUT /api/v1/subscriptions/{id}
pub async fn update_subscription(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Path(id): Path<u64>,
    Json(config): Json<SubscriptionConfig>,
) -> ApiResult<ApiResponse<Subscription>> {
    let subscription = state
        .service
        .registry()
        .update(&user.actor(), SubscriptionId::new(id), config)?;
    Ok(ApiResponse::success(subscription))
}

/// Disable a subscription.
///
/// POST /api/v1/subscriptions/{id}/disable
pub async fn disable_subscription(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Path(id): Path<u64>,
) -> ApiResult<EmptyResponse> {
    state
        .service
        .registry()
        .disable(&user.actor(), SubscriptionId::new(id))?;
    Ok(EmptyResponse::success_with_message("Subscription disabled"))
}
