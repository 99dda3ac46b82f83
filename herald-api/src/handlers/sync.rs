//! Sync endpoint handlers: cursor polling and read/clear state.
//!
//! Clients track their own `since_id` cursor; re-polling with an
//! unchanged cursor returns an identical page, so a client compares the
//! previous response for equality and skips re-rendering when nothing
//! changed.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use herald_core::types::NotificationId;
use herald_engine::SyncPage;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::response::{ApiResponse, EmptyResponse};
use crate::state::AppState;

/// Poll query parameters.
#[derive(Debug, Deserialize)]
pub struct PollQuery {
    /// Cursor: highest notification id the client has already seen.
    #[serde(default)]
    pub since_id: u64,
    /// Requested page size; clamped to the configured maximum.
    pub limit: Option<usize>,
}

/// Cursor poll over the caller's notifications.
///
/// GET /api/v1/notifications?since_id=&limit=
pub async fn poll(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Query(query): Query<PollQuery>,
) -> ApiResult<ApiResponse<SyncPage>> {
    let page = state.service.store().sync(
        &user.id,
        NotificationId::new(query.since_id),
        state.poll_limit(query.limit),
    );
    Ok(ApiResponse::success(page))
}

/// Mark one notification read.
///
/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Path(id): Path<u64>,
) -> ApiResult<EmptyResponse> {
    state
        .service
        .store()
        .mark_read(&user.id, NotificationId::new(id))?;
    Ok(EmptyResponse::success())
}

/// Counts returned by bulk read/clear operations.
#[derive(Debug, Serialize)]
pub struct BulkCountResponse {
    /// Number of notifications affected.
    pub affected: usize,
}

/// Mark every notification read.
///
/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
) -> ApiResult<ApiResponse<BulkCountResponse>> {
    let affected = state.service.store().mark_all_read(&user.id);
    Ok(ApiResponse::success(BulkCountResponse { affected }))
}

/// Clear (soft-delete) every notification.
///
/// DELETE /api/v1/notifications
pub async fn clear_notifications(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
) -> ApiResult<ApiResponse<BulkCountResponse>> {
    let affected = state.service.store().clear(&user.id);
    Ok(ApiResponse::success(BulkCountResponse { affected }))
}
