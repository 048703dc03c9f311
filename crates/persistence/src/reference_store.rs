//! The reference store: sole owner of the persisted dashboard tables.
//!
//! Tables are loaded whole and saved whole. A table that has never been
//! persisted is seeded from its fixture document on first load; after that
//! the persisted snapshot is returned as-is.

use domain::models::{BeaconReader, BeaconSighting, Location, Record, TableKind, Vessel};
use domain::services::ReferenceTables;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::StoreError;
use crate::fixtures::FixtureSource;
use crate::kv::KeyValueStore;

#[derive(Clone)]
pub struct ReferenceStore {
    kv: Arc<dyn KeyValueStore>,
    fixtures: Arc<dyn FixtureSource>,
}

impl ReferenceStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, fixtures: Arc<dyn FixtureSource>) -> Self {
        Self { kv, fixtures }
    }

    pub fn backend(&self) -> &'static str {
        self.kv.backend()
    }

    /// Round-trip to the key-value back end without touching fixtures.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.kv.get(TableKind::Location.storage_key()).await.map(|_| ())
    }

    /// Load a table, seeding it from fixtures if it was never persisted.
    pub async fn load<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let table = T::TABLE;
        if let Some(raw) = self.kv.get(table.storage_key()).await? {
            return decode(table, &raw);
        }

        let raw = self.fixtures.fetch(table).await?;
        let records: Vec<T> = decode(table, &raw)?;
        self.write(table, &records).await?;
        info!(%table, count = records.len(), "Seeded table from fixture");
        Ok(records)
    }

    /// Overwrite a table's snapshot.
    pub async fn save<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        self.write(T::TABLE, records).await
    }

    /// Forget a table's snapshot so the next load re-seeds it.
    pub async fn reset<T: Record>(&self) -> Result<bool, StoreError> {
        self.kv.delete(T::TABLE.storage_key()).await
    }

    /// Load all three reference tables for a correlation tick.
    pub async fn load_tables(&self) -> Result<ReferenceTables, StoreError> {
        Ok(ReferenceTables {
            locations: self.load::<Location>().await?,
            vessels: self.load::<Vessel>().await?,
            readers: self.load::<BeaconReader>().await?,
        })
    }

    /// The last accepted sighting batch; empty if none was ever stored.
    pub async fn load_batch(&self) -> Result<Vec<BeaconSighting>, StoreError> {
        let table = TableKind::BeaconData;
        match self.kv.get(table.storage_key()).await? {
            Some(raw) => decode(table, &raw),
            None => Ok(Vec::new()),
        }
    }

    pub async fn save_batch(&self, batch: &[BeaconSighting]) -> Result<(), StoreError> {
        self.write(TableKind::BeaconData, batch).await
    }

    async fn write<T: Serialize>(&self, table: TableKind, records: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)
            .map_err(|source| StoreError::Serialization { table, source })?;
        self.kv.set(table.storage_key(), &raw).await
    }
}

fn decode<T: DeserializeOwned>(table: TableKind, raw: &str) -> Result<Vec<T>, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Serialization { table, source })
}
