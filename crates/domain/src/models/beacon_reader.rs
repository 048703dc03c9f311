//! Beacon reader domain model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::table::{Record, TableKind};

/// A fixed gateway device installed at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BeaconReader {
    pub id: i64,
    pub name: String,
    pub location_id: i64,
    pub mac: String,
}

impl Record for BeaconReader {
    const TABLE: TableKind = TableKind::BeaconReader;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Reader joined with the name of the location it is installed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResolvedReader {
    pub id: i64,
    pub name: String,
    pub location_id: i64,
    pub location_name: String,
    pub mac: String,
}

/// Payload for adding (`Id == 0`) or editing a beacon reader.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ReaderInput {
    #[serde(default)]
    pub id: i64,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(range(min = 1, message = "Location must be selected"))]
    pub location_id: i64,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub mac: String,
}

impl ReaderInput {
    pub fn into_reader(self, id: i64) -> BeaconReader {
        BeaconReader {
            id,
            name: self.name,
            location_id: self.location_id,
            mac: self.mac,
        }
    }
}
