//! Reference table identities and the record contract.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// The persisted tables of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Location,
    Vessel,
    BeaconReader,
    BeaconData,
}

impl TableKind {
    /// Key under which the table snapshot is stored.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Location => "locationTable",
            Self::Vessel => "vesselTable",
            Self::BeaconReader => "beaconReaderTable",
            Self::BeaconData => "beaconDataTable",
        }
    }

    /// Fixture document used to seed the table on first load.
    ///
    /// Sighting batches come from the feed and are never seeded.
    pub fn fixture_file(&self) -> Option<&'static str> {
        match self {
            Self::Location => Some("Location.json"),
            Self::Vessel => Some("Vessel.json"),
            Self::BeaconReader => Some("BeaconReader.json"),
            Self::BeaconData => None,
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// A row of a reference table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table the record belongs to.
    const TABLE: TableKind;

    fn id(&self) -> i64;
}

/// Returns the id a new record receives: the current maximum plus one.
///
/// Single-writer only; two editors computing this concurrently collide.
pub fn next_id<T: Record>(records: &[T]) -> i64 {
    records.iter().map(Record::id).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vessel;

    fn vessel(id: i64) -> Vessel {
        Vessel {
            id,
            name: format!("Vessel {}", id),
            mac: format!("MAC-{}", id),
        }
    }

    #[test]
    fn test_storage_keys() {
        assert_eq!(TableKind::Location.storage_key(), "locationTable");
        assert_eq!(TableKind::Vessel.storage_key(), "vesselTable");
        assert_eq!(TableKind::BeaconReader.storage_key(), "beaconReaderTable");
        assert_eq!(TableKind::BeaconData.storage_key(), "beaconDataTable");
    }

    #[test]
    fn test_fixture_files() {
        assert_eq!(TableKind::Location.fixture_file(), Some("Location.json"));
        assert_eq!(TableKind::BeaconReader.fixture_file(), Some("BeaconReader.json"));
        assert_eq!(TableKind::BeaconData.fixture_file(), None);
    }

    #[test]
    fn test_display_uses_storage_key() {
        assert_eq!(TableKind::Vessel.to_string(), "vesselTable");
    }

    #[test]
    fn test_next_id_empty_table() {
        let table: Vec<Vessel> = Vec::new();
        assert_eq!(next_id(&table), 1);
    }

    #[test]
    fn test_next_id_uses_max_not_len() {
        let table = vec![vessel(3), vessel(7), vessel(5)];
        assert_eq!(next_id(&table), 8);
    }
}
