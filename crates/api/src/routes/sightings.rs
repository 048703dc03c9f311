//! Raw sighting batch handler.

use axum::{extract::State, Json};
use domain::models::BeaconSighting;

use crate::app::AppState;

/// The last accepted batch, as received from the feed.
///
/// GET /api/v1/sightings
pub async fn latest_sightings(State(state): State<AppState>) -> Json<Vec<BeaconSighting>> {
    Json(state.service.latest_batch().await)
}
