//! Beacon sighting domain model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// `Type` value carried by the reading a reader emits about itself.
pub const GATEWAY_TYPE: &str = "Gateway";

/// One reading in a feed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BeaconSighting {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub time_stamp: DateTime<Utc>,
    #[serde(rename = "Type")]
    pub kind: String,
    pub mac: String,
    #[serde(default)]
    pub ble_name: String,
    #[serde(default)]
    pub rssi: i32,
    #[serde(default)]
    pub raw_data: String,
}

impl BeaconSighting {
    pub fn is_gateway(&self) -> bool {
        self.kind == GATEWAY_TYPE
    }
}

/// Accepts RFC 3339 timestamps as well as offset-less ones, read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid sighting timestamp: {}", raw))
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
