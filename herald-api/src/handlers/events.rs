//! Event ingestion handler: the inbound surface for the trade/strategy
//! engine.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use herald_core::event::StrategyEvent;
use herald_core::types::EventId;

use crate::error::{ApiError, ApiResult};
use crate::middleware::Auth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Ingest acknowledgement.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// The sequencer-assigned event id.
    pub event_id: EventId,
}

/// Append one lifecycle event.
///
/// POST /api/v1/events
///
/// Restricted to the trade-engine service identity (and admins, for
/// manual backfills). The event is sequenced and matched before the
/// response; channel dispatch continues asynchronously.
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Json(event): Json<StrategyEvent>,
) -> ApiResult<ApiResponse<IngestResponse>> {
    if !user.role.may_ingest() {
        return Err(ApiError::Forbidden(
            "event ingestion requires the service identity".to_string(),
        ));
    }

    let event_id = state.service.ingest(event).await;
    Ok(ApiResponse::success(IngestResponse { event_id }))
}
