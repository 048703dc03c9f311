//! Beacon-to-location correlation.
//!
//! A batch carries one reading from the gateway reader plus readings from
//! every beacon the reader heard. The gateway's Mac identifies the reader,
//! the reader identifies the location, and every known vessel heard in the
//! batch is placed at that location.

use serde::Serialize;
use tracing::debug;

use crate::error::CorrelationError;
use crate::models::{BeaconReader, BeaconSighting, Location, MapAnnotation, Vessel};

/// Latitude added per resolved vessel so markers at one location don't overlap.
pub const LATITUDE_STEP: f64 = 0.0001;

/// Reference tables read by a correlation tick.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub locations: Vec<Location>,
    pub vessels: Vec<Vessel>,
    pub readers: Vec<BeaconReader>,
}

/// Result of a successful correlation tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationOutcome {
    pub annotations: Vec<MapAnnotation>,
    /// Reader that reported the batch; `None` for an empty batch.
    pub reader_id: Option<i64>,
    pub location_id: Option<i64>,
    /// Vessel sightings whose Mac matched no registered vessel.
    pub unmatched: usize,
}

impl CorrelationOutcome {
    fn empty() -> Self {
        Self {
            annotations: Vec::new(),
            reader_id: None,
            location_id: None,
            unmatched: 0,
        }
    }
}

/// Projects a sighting batch onto map annotations.
///
/// The output replaces any previous annotation list; nothing is carried over
/// between ticks.
pub fn correlate(
    sightings: &[BeaconSighting],
    tables: &ReferenceTables,
) -> Result<CorrelationOutcome, CorrelationError> {
    if sightings.is_empty() {
        return Ok(CorrelationOutcome::empty());
    }

    let gateway = sightings
        .iter()
        .find(|s| s.is_gateway())
        .ok_or(CorrelationError::NoGateway)?;

    let reader = tables
        .readers
        .iter()
        .find(|r| r.mac == gateway.mac)
        .ok_or_else(|| CorrelationError::UnknownReader {
            mac: gateway.mac.clone(),
        })?;

    let location = tables
        .locations
        .iter()
        .find(|l| l.id == reader.location_id)
        .ok_or(CorrelationError::UnknownLocation {
            reader_id: reader.id,
            location_id: reader.location_id,
        })?;

    let mut annotations = Vec::new();
    let mut unmatched = 0;

    for sighting in sightings.iter().filter(|s| !s.is_gateway()) {
        let Some(vessel) = tables.vessels.iter().find(|v| v.mac == sighting.mac) else {
            debug!(mac = %sighting.mac, "Dropping sighting of unregistered beacon");
            unmatched += 1;
            continue;
        };

        let offset = annotations.len() as f64 * LATITUDE_STEP;
        annotations.push(MapAnnotation {
            latitude: location.latitude + offset,
            longitude: location.longitude,
            vessel_name: vessel.name.clone(),
            location_name: location.name.clone(),
            description: describe(location, sighting),
        });
    }

    Ok(CorrelationOutcome {
        annotations,
        reader_id: Some(reader.id),
        location_id: Some(location.id),
        unmatched,
    })
}

fn describe(location: &Location, sighting: &BeaconSighting) -> String {
    format!(
        "Location: {}\nLatitude: {}\nLongitude: {}\nLast Seen Date: {}",
        location.name,
        location.latitude,
        location.longitude,
        sighting.time_stamp.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sighting(kind: &str, mac: &str) -> BeaconSighting {
        BeaconSighting {
            time_stamp: Utc.with_ymd_and_hms(2019, 6, 14, 9, 30, 0).unwrap(),
            kind: kind.to_string(),
            mac: mac.to_string(),
            ble_name: String::new(),
            rssi: -60,
            raw_data: String::new(),
        }
    }

    fn gateway(mac: &str) -> BeaconSighting {
        sighting("Gateway", mac)
    }

    fn beacon(mac: &str) -> BeaconSighting {
        sighting("iBeacon", mac)
    }

    fn tables() -> ReferenceTables {
        ReferenceTables {
            locations: vec![Location {
                id: 1,
                name: "Dock".to_string(),
                latitude: 41.0,
                longitude: 29.0,
            }],
            vessels: vec![
                Vessel {
                    id: 1,
                    name: "Alpha".to_string(),
                    mac: "V1".to_string(),
                },
                Vessel {
                    id: 2,
                    name: "Bravo".to_string(),
                    mac: "V2".to_string(),
                },
            ],
            readers: vec![BeaconReader {
                id: 1,
                name: "Dock".to_string(),
                location_id: 1,
                mac: "R1".to_string(),
            }],
        }
    }

    #[test]
    fn test_known_vessel_placed_at_reader_location() {
        let batch = vec![gateway("R1"), beacon("V1"), beacon("UNKNOWN")];

        let outcome = correlate(&batch, &tables()).unwrap();
        assert_eq!(outcome.annotations.len(), 1);
        let annotation = &outcome.annotations[0];
        assert_eq!(annotation.vessel_name, "Alpha");
        assert_eq!(annotation.location_name, "Dock");
        assert_eq!(annotation.latitude, 41.0);
        assert_eq!(annotation.longitude, 29.0);
        assert_eq!(outcome.unmatched, 1);
        assert_eq!(outcome.reader_id, Some(1));
        assert_eq!(outcome.location_id, Some(1));
    }

    #[test]
    fn test_resolved_vessels_are_offset_in_latitude() {
        let batch = vec![beacon("V1"), gateway("R1"), beacon("V2")];

        let outcome = correlate(&batch, &tables()).unwrap();
        let [first, second] = outcome.annotations.as_slice() else {
            panic!("expected two annotations");
        };
        assert!((second.latitude - first.latitude - LATITUDE_STEP).abs() < 1e-9);
        assert_eq!(first.longitude, second.longitude);
        assert_eq!(first.vessel_name, "Alpha");
        assert_eq!(second.vessel_name, "Bravo");
    }

    #[test]
    fn test_unmatched_sightings_do_not_consume_offset() {
        let batch = vec![gateway("R1"), beacon("NOPE"), beacon("V2")];

        let outcome = correlate(&batch, &tables()).unwrap();
        assert_eq!(outcome.annotations.len(), 1);
        assert_eq!(outcome.annotations[0].latitude, 41.0);
    }

    #[test]
    fn test_description_lists_location_and_timestamp() {
        let batch = vec![gateway("R1"), beacon("V1")];

        let outcome = correlate(&batch, &tables()).unwrap();
        assert_eq!(
            outcome.annotations[0].description,
            "Location: Dock\nLatitude: 41\nLongitude: 29\nLast Seen Date: 2019-06-14T09:30:00+00:00"
        );
    }

    #[test]
    fn test_no_gateway_is_an_error() {
        let batch = vec![beacon("V1"), beacon("V2")];
        assert_eq!(
            correlate(&batch, &tables()),
            Err(CorrelationError::NoGateway)
        );
    }

    #[test]
    fn test_unknown_reader_is_an_error() {
        let batch = vec![gateway("R9"), beacon("V1")];
        assert_eq!(
            correlate(&batch, &tables()),
            Err(CorrelationError::UnknownReader {
                mac: "R9".to_string()
            })
        );
    }

    #[test]
    fn test_reader_with_missing_location_is_an_error() {
        let mut tables = tables();
        tables.readers[0].location_id = 42;
        let batch = vec![gateway("R1"), beacon("V1")];
        assert_eq!(
            correlate(&batch, &tables),
            Err(CorrelationError::UnknownLocation {
                reader_id: 1,
                location_id: 42
            })
        );
    }

    #[test]
    fn test_empty_batch_yields_no_annotations() {
        let outcome = correlate(&[], &tables()).unwrap();
        assert!(outcome.annotations.is_empty());
        assert_eq!(outcome.reader_id, None);
    }

    #[test]
    fn test_gateway_only_batch() {
        let outcome = correlate(&[gateway("R1")], &tables()).unwrap();
        assert!(outcome.annotations.is_empty());
        assert_eq!(outcome.unmatched, 0);
    }

    #[test]
    fn test_first_gateway_wins() {
        let mut tables = tables();
        tables.locations.push(Location {
            id: 2,
            name: "Pier".to_string(),
            latitude: 40.0,
            longitude: 28.0,
        });
        tables.readers.push(BeaconReader {
            id: 2,
            name: "Pier".to_string(),
            location_id: 2,
            mac: "R2".to_string(),
        });
        let batch = vec![gateway("R2"), gateway("R1"), beacon("V1")];

        let outcome = correlate(&batch, &tables).unwrap();
        assert_eq!(outcome.location_id, Some(2));
        assert_eq!(outcome.annotations.len(), 1);
        assert_eq!(outcome.annotations[0].location_name, "Pier");
    }

    #[test]
    fn test_correlation_is_deterministic() {
        let batch = vec![gateway("R1"), beacon("V2"), beacon("X"), beacon("V1")];
        let tables = tables();

        let first = correlate(&batch, &tables).unwrap();
        let second = correlate(&batch, &tables).unwrap();
        assert_eq!(first, second);
    }
}
