//! Map rendering surface.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use domain::models::{BoundingBox, MapAnnotation};
use geo::{coord, Rect};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&BoundingBox> for MapCenter {
    fn from(bbox: &BoundingBox) -> Self {
        let rect = Rect::new(
            coord! { x: bbox.min_longitude, y: bbox.min_latitude },
            coord! { x: bbox.max_longitude, y: bbox.max_latitude },
        );
        let center = rect.center();
        Self {
            latitude: center.y,
            longitude: center.x,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub annotations: Vec<MapAnnotation>,
    pub bounding_box: BoundingBox,
    pub center: MapCenter,
    pub sequence: u64,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Annotations that fall outside the bounding box and will not be visible.
    pub out_of_bounds: usize,
}

/// GET /api/v1/map
pub async fn get_map(State(state): State<AppState>) -> Json<MapResponse> {
    let snapshot = state.service.snapshot();
    let bounding_box = state.config.map.bounding_box();

    let out_of_bounds = snapshot
        .annotations
        .iter()
        .filter(|a| !bounding_box.contains(a.latitude, a.longitude))
        .count();

    Json(MapResponse {
        center: MapCenter::from(&bounding_box),
        annotations: snapshot.annotations,
        bounding_box,
        sequence: snapshot.sequence,
        updated_at: snapshot.updated_at,
        last_error: snapshot.last_error,
        out_of_bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_of_default_box() {
        let center = MapCenter::from(&BoundingBox::default());
        assert_eq!(center.latitude, 39.0);
        assert_eq!(center.longitude, 35.5);
    }
}
