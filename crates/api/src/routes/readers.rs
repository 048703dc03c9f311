//! Beacon reader endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{BeaconReader, ReaderInput};
use domain::services::ReaderResolution;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Readers joined to their location name. Readers whose location no longer
/// exists are listed with `"status": "orphaned"`.
///
/// GET /api/v1/readers
pub async fn list_readers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReaderResolution>>, ApiError> {
    Ok(Json(state.service.list_readers().await?))
}

/// POST /api/v1/readers
pub async fn create_reader(
    State(state): State<AppState>,
    Json(mut input): Json<ReaderInput>,
) -> Result<(StatusCode, Json<BeaconReader>), ApiError> {
    input.validate()?;
    input.id = 0;

    let reader = state.service.save_reader(input).await?;
    Ok((StatusCode::CREATED, Json(reader)))
}

/// PUT /api/v1/readers/:id
pub async fn update_reader(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut input): Json<ReaderInput>,
) -> Result<Json<BeaconReader>, ApiError> {
    if id <= 0 {
        return Err(ApiError::NotFound(format!("Reader {}", id)));
    }
    input.validate()?;
    input.id = id;

    Ok(Json(state.service.save_reader(input).await?))
}

/// DELETE /api/v1/readers/:id
pub async fn delete_reader(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_reader(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
