//! Vessel endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{Vessel, VesselInput};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/vessels
pub async fn list_vessels(State(state): State<AppState>) -> Result<Json<Vec<Vessel>>, ApiError> {
    Ok(Json(state.service.list_vessels().await?))
}

/// POST /api/v1/vessels
pub async fn create_vessel(
    State(state): State<AppState>,
    Json(mut input): Json<VesselInput>,
) -> Result<(StatusCode, Json<Vessel>), ApiError> {
    input.validate()?;
    input.id = 0;

    let vessel = state.service.save_vessel(input).await?;
    Ok((StatusCode::CREATED, Json(vessel)))
}

/// PUT /api/v1/vessels/:id
pub async fn update_vessel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut input): Json<VesselInput>,
) -> Result<Json<Vessel>, ApiError> {
    if id <= 0 {
        return Err(ApiError::NotFound(format!("Vessel {}", id)));
    }
    input.validate()?;
    input.id = id;

    Ok(Json(state.service.save_vessel(input).await?))
}

/// DELETE /api/v1/vessels/:id
pub async fn delete_vessel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_vessel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
