//! Map annotation domain model.

use serde::{Deserialize, Serialize};

/// A vessel marker projected onto the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapAnnotation {
    pub latitude: f64,
    pub longitude: f64,
    pub vessel_name: String,
    pub location_name: String,
    pub description: String,
}

/// Geographic window the rendering surface is fitted to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min_latitude: 36.0,
            max_latitude: 42.0,
            min_longitude: 26.0,
            max_longitude: 45.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounding_box() {
        let bbox = BoundingBox::default();
        assert_eq!(bbox.min_latitude, 36.0);
        assert_eq!(bbox.max_latitude, 42.0);
        assert_eq!(bbox.min_longitude, 26.0);
        assert_eq!(bbox.max_longitude, 45.0);
    }

    #[test]
    fn test_bounding_box_contains() {
        let bbox = BoundingBox::default();
        assert!(bbox.contains(41.0, 29.0));
        assert!(bbox.contains(36.0, 45.0));
        assert!(!bbox.contains(51.5, -0.1));
    }

    #[test]
    fn test_annotation_serializes_pascal_case() {
        let annotation = MapAnnotation {
            latitude: 41.0,
            longitude: 29.0,
            vessel_name: "Alpha".to_string(),
            location_name: "Dock".to_string(),
            description: String::new(),
        };
        let value = serde_json::to_value(&annotation).unwrap();
        assert_eq!(value["VesselName"], "Alpha");
        assert_eq!(value["LocationName"], "Dock");
    }
}
