//! Joins beacon readers to the locations they are installed at.

use serde::Serialize;

use crate::models::{BeaconReader, Location, ResolvedReader};

/// Outcome of resolving one reader's location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReaderResolution {
    Resolved(ResolvedReader),
    Orphaned {
        reader: BeaconReader,
        missing_location_id: i64,
    },
}

impl ReaderResolution {
    pub fn resolved(&self) -> Option<&ResolvedReader> {
        match self {
            Self::Resolved(reader) => Some(reader),
            Self::Orphaned { .. } => None,
        }
    }
}

/// Resolves every reader against the location table, preserving reader order.
///
/// A reader whose `LocationId` matches no location yields
/// [`ReaderResolution::Orphaned`] instead of being dropped.
pub fn resolve_readers(locations: &[Location], readers: &[BeaconReader]) -> Vec<ReaderResolution> {
    readers
        .iter()
        .map(|reader| match locations.iter().find(|l| l.id == reader.location_id) {
            Some(location) => ReaderResolution::Resolved(ResolvedReader {
                id: reader.id,
                name: reader.name.clone(),
                location_id: reader.location_id,
                location_name: location.name.clone(),
                mac: reader.mac.clone(),
            }),
            None => ReaderResolution::Orphaned {
                reader: reader.clone(),
                missing_location_id: reader.location_id,
            },
        })
        .collect()
}

/// Only the readers whose location could be resolved.
pub fn resolved_only(resolutions: &[ReaderResolution]) -> Vec<ResolvedReader> {
    resolutions
        .iter()
        .filter_map(ReaderResolution::resolved)
        .cloned()
        .collect()
}

/// Only the readers pointing at a missing location.
pub fn orphaned_only(resolutions: &[ReaderResolution]) -> Vec<BeaconReader> {
    resolutions
        .iter()
        .filter_map(|r| match r {
            ReaderResolution::Orphaned { reader, .. } => Some(reader.clone()),
            ReaderResolution::Resolved(_) => None,
        })
        .collect()
}
