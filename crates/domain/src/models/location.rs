//! Location domain model.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::table::{Record, TableKind};

/// A fixed site where a beacon reader is installed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Whether this location sits on exactly the given coordinates.
    pub fn same_coordinates(&self, latitude: f64, longitude: f64) -> bool {
        self.latitude == latitude && self.longitude == longitude
    }
}

impl Record for Location {
    const TABLE: TableKind = TableKind::Location;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Payload for adding (`Id == 0`) or editing a location.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct LocationInput {
    #[serde(default)]
    pub id: i64,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(custom(function = "validate_site_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "validate_site_longitude"))]
    pub longitude: f64,
}

fn validate_site_latitude(latitude: f64) -> Result<(), ValidationError> {
    shared::validation::validate_positive_coordinate(latitude)?;
    shared::validation::validate_latitude(latitude)
}

fn validate_site_longitude(longitude: f64) -> Result<(), ValidationError> {
    shared::validation::validate_positive_coordinate(longitude)?;
    shared::validation::validate_longitude(longitude)
}

impl LocationInput {
    pub fn into_location(self, id: i64) -> Location {
        Location {
            id,
            name: self.name,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
