//! Feed poller control endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::feed::PollerStatus;
use crate::services::TickOutcome;

#[derive(Debug, Serialize)]
pub struct FeedControlResponse {
    /// False when the poller was already in the requested state.
    pub changed: bool,
    pub status: PollerStatus,
}

/// POST /api/v1/feed/start
pub async fn start_feed(State(state): State<AppState>) -> Json<FeedControlResponse> {
    let changed = state.poller.start().await;
    Json(FeedControlResponse {
        changed,
        status: state.poller.status().await,
    })
}

/// POST /api/v1/feed/stop
pub async fn stop_feed(State(state): State<AppState>) -> Json<FeedControlResponse> {
    let changed = state.poller.stop().await;
    Json(FeedControlResponse {
        changed,
        status: state.poller.status().await,
    })
}

/// Run a single tick now, independent of the poller.
///
/// POST /api/v1/feed/poll
pub async fn poll_feed(State(state): State<AppState>) -> Result<Json<TickOutcome>, ApiError> {
    Ok(Json(state.service.poll_once().await?))
}

/// GET /api/v1/feed/status
pub async fn feed_status(State(state): State<AppState>) -> Json<PollerStatus> {
    Json(state.poller.status().await)
}
