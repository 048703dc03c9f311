//! Vessel domain model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::table::{Record, TableKind};

/// A tracked vessel, identified on the air by its beacon Mac.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vessel {
    pub id: i64,
    pub name: String,
    pub mac: String,
}

impl Record for Vessel {
    const TABLE: TableKind = TableKind::Vessel;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Payload for adding (`Id == 0`) or editing a vessel.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct VesselInput {
    #[serde(default)]
    pub id: i64,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub mac: String,
}

impl VesselInput {
    pub fn into_vessel(self, id: i64) -> Vessel {
        Vessel {
            id,
            name: self.name,
            mac: self.mac,
        }
    }
}
