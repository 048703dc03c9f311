//! Location endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{Location, LocationInput};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/locations
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.service.list_locations().await?))
}

/// Add a location. Any `Id` in the body is ignored.
///
/// POST /api/v1/locations
pub async fn create_location(
    State(state): State<AppState>,
    Json(mut input): Json<LocationInput>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    input.validate()?;
    input.id = 0;

    let location = state.service.save_location(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// PUT /api/v1/locations/:id
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut input): Json<LocationInput>,
) -> Result<Json<Location>, ApiError> {
    if id <= 0 {
        return Err(ApiError::NotFound(format!("Location {}", id)));
    }
    input.validate()?;
    input.id = id;

    Ok(Json(state.service.save_location(input).await?))
}

/// Delete a location no reader points at.
///
/// DELETE /api/v1/locations/:id
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
