//! Tracking service: feeds sighting batches through correlation and keeps
//! the published map up to date.
//!
//! Reference tables are only reached through the [`ReferenceStore`]. Table
//! edits are serialized by one mutex; this covers a single operator, not
//! concurrent editors working from stale copies.

use chrono::{DateTime, Utc};
use domain::models::{
    BeaconReader, BeaconSighting, Location, LocationInput, MapAnnotation, ReaderInput, Vessel,
    VesselInput,
};
use domain::services::{correlate, editor, resolve_readers, CorrelationOutcome, ReaderResolution};
use domain::{CorrelationError, DomainError};
use metrics::{counter, gauge};
use persistence::{ReferenceStore, StoreError};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::feed::{BeaconFeed, FeedError};

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// What the rendering surface shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    pub annotations: Vec<MapAnnotation>,
    /// Feed sequence of the batch the annotations were built from (0 = restored or none).
    pub sequence: u64,
    pub updated_at: Option<DateTime<Utc>>,
    /// Why the most recent correlation was skipped, if it was.
    pub last_error: Option<String>,
}

/// Result of handling one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    Correlated {
        sequence: u64,
        annotations: usize,
        unmatched: usize,
    },
    /// A newer request was issued before this response arrived.
    Stale { sequence: u64, latest: u64 },
    /// The batch was stored but could not be placed on the map.
    Skipped { sequence: u64, reason: String },
}

#[derive(Debug, Default)]
struct AcceptedBatch {
    sequence: u64,
    sightings: Vec<BeaconSighting>,
}

pub struct TrackingService {
    store: ReferenceStore,
    feed: Arc<dyn BeaconFeed>,
    issued: AtomicU64,
    batch: RwLock<AcceptedBatch>,
    editor_lock: Mutex<()>,
    map_tx: watch::Sender<MapSnapshot>,
}

impl TrackingService {
    pub fn new(store: ReferenceStore, feed: Arc<dyn BeaconFeed>) -> Self {
        let (map_tx, _) = watch::channel(MapSnapshot::default());
        Self {
            store,
            feed,
            issued: AtomicU64::new(0),
            batch: RwLock::new(AcceptedBatch::default()),
            editor_lock: Mutex::new(()),
            map_tx,
        }
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    /// Reload the last persisted batch and rebuild the map from it.
    pub async fn restore(&self) -> Result<(), TrackingError> {
        let sightings = self.store.load_batch().await?;
        info!(count = sightings.len(), "Restored persisted sighting batch");
        *self.batch.write().await = AcceptedBatch {
            sequence: 0,
            sightings,
        };
        self.refresh_map().await?;
        Ok(())
    }

    pub fn snapshot(&self) -> MapSnapshot {
        self.map_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MapSnapshot> {
        self.map_tx.subscribe()
    }

    /// Highest sequence number handed to the feed so far.
    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub async fn latest_batch(&self) -> Vec<BeaconSighting> {
        self.batch.read().await.sightings.clone()
    }

    // =========================================================================
    // Feed ticks
    // =========================================================================

    /// Issue the next sequence number, fetch its batch and handle it.
    pub async fn poll_once(&self) -> Result<TickOutcome, TrackingError> {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        match self.feed.fetch(sequence).await {
            Ok(batch) => self.accept(sequence, batch).await,
            Err(e) => {
                counter!("feed_ticks_total", "outcome" => e.outcome()).increment(1);
                warn!(sequence, error = %e, "Feed fetch failed, skipping tick");
                Err(e.into())
            }
        }
    }

    /// Accept a fetched batch unless a newer request has been issued since.
    pub async fn accept(
        &self,
        sequence: u64,
        sightings: Vec<BeaconSighting>,
    ) -> Result<TickOutcome, TrackingError> {
        let mut current = self.batch.write().await;

        let latest = self.latest_issued();
        if sequence != latest {
            counter!("feed_ticks_total", "outcome" => "stale").increment(1);
            debug!(sequence, latest, "Discarding stale sighting batch");
            return Ok(TickOutcome::Stale { sequence, latest });
        }

        self.store.save_batch(&sightings).await?;
        *current = AcceptedBatch {
            sequence,
            sightings,
        };

        let tables = self.store.load_tables().await?;
        let result = correlate(&current.sightings, &tables);
        let outcome = self.publish(sequence, result);
        counter!("feed_ticks_total", "outcome" => "accepted").increment(1);
        Ok(outcome)
    }

    /// Re-run correlation over the current batch, e.g. after a table edit.
    pub async fn refresh_map(&self) -> Result<TickOutcome, TrackingError> {
        let current = self.batch.read().await;
        let tables = self.store.load_tables().await?;
        let result = correlate(&current.sightings, &tables);
        Ok(self.publish(current.sequence, result))
    }

    fn publish(
        &self,
        sequence: u64,
        result: Result<CorrelationOutcome, CorrelationError>,
    ) -> TickOutcome {
        match result {
            Ok(outcome) => {
                let annotations = outcome.annotations.len();
                gauge!("correlation_annotations").set(annotations as f64);
                debug!(
                    sequence,
                    annotations,
                    unmatched = outcome.unmatched,
                    reader_id = ?outcome.reader_id,
                    "Correlation completed"
                );
                self.map_tx.send_replace(MapSnapshot {
                    annotations: outcome.annotations,
                    sequence,
                    updated_at: Some(Utc::now()),
                    last_error: None,
                });
                TickOutcome::Correlated {
                    sequence,
                    annotations,
                    unmatched: outcome.unmatched,
                }
            }
            Err(e) => {
                counter!("correlation_failures_total", "reason" => e.reason()).increment(1);
                warn!(sequence, error = %e, "Correlation skipped, keeping previous map");
                self.map_tx
                    .send_modify(|snapshot| snapshot.last_error = Some(e.to_string()));
                TickOutcome::Skipped {
                    sequence,
                    reason: e.reason().to_string(),
                }
            }
        }
    }

    async fn refresh_after_edit(&self) {
        if let Err(e) = self.refresh_map().await {
            warn!(error = %e, "Map refresh after edit failed");
        }
    }

    // =========================================================================
    // Locations
    // =========================================================================

    pub async fn list_locations(&self) -> Result<Vec<Location>, TrackingError> {
        Ok(self.store.load().await?)
    }

    pub async fn save_location(&self, input: LocationInput) -> Result<Location, TrackingError> {
        let saved = {
            let _guard = self.editor_lock.lock().await;
            let mut table = self.store.load::<Location>().await?;
            let saved = editor::save_location(&mut table, input)?;
            self.store.save(&table).await?;
            saved
        };
        self.refresh_after_edit().await;
        Ok(saved)
    }

    pub async fn delete_location(&self, id: i64) -> Result<Location, TrackingError> {
        let removed = {
            let _guard = self.editor_lock.lock().await;
            let readers = self.store.load::<BeaconReader>().await?;
            let mut table = self.store.load::<Location>().await?;
            let removed = editor::delete_location(&mut table, &readers, id)?;
            self.store.save(&table).await?;
            removed
        };
        self.refresh_after_edit().await;
        Ok(removed)
    }

    // =========================================================================
    // Vessels
    // =========================================================================

    pub async fn list_vessels(&self) -> Result<Vec<Vessel>, TrackingError> {
        Ok(self.store.load().await?)
    }

    pub async fn save_vessel(&self, input: VesselInput) -> Result<Vessel, TrackingError> {
        let saved = {
            let _guard = self.editor_lock.lock().await;
            let mut table = self.store.load::<Vessel>().await?;
            let saved = editor::save_vessel(&mut table, input)?;
            self.store.save(&table).await?;
            saved
        };
        self.refresh_after_edit().await;
        Ok(saved)
    }

    pub async fn delete_vessel(&self, id: i64) -> Result<Vessel, TrackingError> {
        let removed = {
            let _guard = self.editor_lock.lock().await;
            let mut table = self.store.load::<Vessel>().await?;
            let removed = editor::delete_vessel(&mut table, id)?;
            self.store.save(&table).await?;
            removed
        };
        self.refresh_after_edit().await;
        Ok(removed)
    }

    // =========================================================================
    // Beacon readers
    // =========================================================================

    pub async fn list_readers(&self) -> Result<Vec<ReaderResolution>, TrackingError> {
        let locations = self.store.load::<Location>().await?;
        let readers = self.store.load::<BeaconReader>().await?;
        Ok(resolve_readers(&locations, &readers))
    }

    pub async fn save_reader(&self, input: ReaderInput) -> Result<BeaconReader, TrackingError> {
        let saved = {
            let _guard = self.editor_lock.lock().await;
            let locations = self.store.load::<Location>().await?;
            let mut table = self.store.load::<BeaconReader>().await?;
            let saved = editor::save_reader(&mut table, &locations, input)?;
            self.store.save(&table).await?;
            saved
        };
        self.refresh_after_edit().await;
        Ok(saved)
    }

    pub async fn delete_reader(&self, id: i64) -> Result<BeaconReader, TrackingError> {
        let removed = {
            let _guard = self.editor_lock.lock().await;
            let mut table = self.store.load::<BeaconReader>().await?;
            let removed = editor::delete_reader(&mut table, id)?;
            self.store.save(&table).await?;
            removed
        };
        self.refresh_after_edit().await;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::ScriptedFeed;
    use chrono::TimeZone;
    use fake::faker::company::en::CompanyName;
    use fake::Fake;
    use persistence::{InMemoryKeyValueStore, StaticFixtureSource};
    use std::time::Duration;
    use tokio_test::assert_ok;

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

    fn fixtures() -> StaticFixtureSource {
        StaticFixtureSource::empty()
            .with_records(&[Location {
                id: 1,
                name: "Dock".to_string(),
                latitude: 41.0,
                longitude: 29.0,
            }])
            .with_records(&[Vessel {
                id: 1,
                name: "Alpha".to_string(),
                mac: "V1".to_string(),
            }])
            .with_records(&[BeaconReader {
                id: 1,
                name: "Dock".to_string(),
                location_id: 1,
                mac: "R1".to_string(),
            }])
    }

    fn service(feed: ScriptedFeed) -> TrackingService {
        let store = ReferenceStore::new(
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(fixtures()),
        );
        TrackingService::new(store, Arc::new(feed))
    }

    fn dock_batch() -> Vec<BeaconSighting> {
        vec![
            sighting("Gateway", "R1"),
            sighting("iBeacon", "V1"),
            sighting("iBeacon", "UNKNOWN"),
        ]
    }

    #[tokio::test]
    async fn test_poll_once_publishes_annotations() {
        let service = service(ScriptedFeed::always(dock_batch()));

        let outcome = service.poll_once().await.unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Correlated {
                sequence: 1,
                annotations: 1,
                unmatched: 1
            }
        );
        let snapshot = service.snapshot();
        assert_eq!(snapshot.annotations.len(), 1);
        assert_eq!(snapshot.annotations[0].vessel_name, "Alpha");
        assert_eq!(snapshot.sequence, 1);
        assert!(snapshot.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_sequence_starts_at_one_and_increments() {
        let feed = ScriptedFeed::always(dock_batch());
        let requested = feed.requested();
        let service = service(feed);

        service.poll_once().await.unwrap();
        service.poll_once().await.unwrap();
        assert_eq!(*requested.lock().await, vec![1, 2]);
        assert_eq!(service.latest_issued(), 2);
    }

    #[tokio::test]
    async fn test_accepted_batch_is_persisted() {
        let service = service(ScriptedFeed::always(dock_batch()));
        service.poll_once().await.unwrap();

        let stored = service.store().load_batch().await.unwrap();
        assert_eq!(stored, dock_batch());
        assert_eq!(service.latest_batch().await, dock_batch());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let service = service(ScriptedFeed::always(Vec::new()));
        service.issued.store(5, Ordering::SeqCst);

        let outcome = service.accept(4, dock_batch()).await.unwrap();
        assert_eq!(outcome, TickOutcome::Stale { sequence: 4, latest: 5 });
        assert!(service.latest_batch().await.is_empty());
        assert!(service.snapshot().annotations.is_empty());
    }

    #[tokio::test]
    async fn test_slow_older_response_cannot_overwrite_newer() {
        let feed = ScriptedFeed::always(dock_batch()).with_delay(1, Duration::from_millis(200));
        let service = Arc::new(service(feed));

        let slow = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.poll_once().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fast = service.poll_once().await.unwrap();
        let slow = slow.await.unwrap().unwrap();

        assert!(matches!(fast, TickOutcome::Correlated { sequence: 2, .. }));
        assert_eq!(slow, TickOutcome::Stale { sequence: 1, latest: 2 });
        assert_eq!(service.snapshot().sequence, 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_map() {
        let feed = ScriptedFeed::always(dock_batch()).failing_on(2);
        let service = service(feed);

        service.poll_once().await.unwrap();
        let err = service.poll_once().await.unwrap_err();
        assert!(matches!(err, TrackingError::Feed(_)));
        assert_eq!(service.snapshot().annotations.len(), 1);
        assert_eq!(service.snapshot().sequence, 1);
    }

    #[tokio::test]
    async fn test_batch_without_gateway_is_skipped() {
        let service = service(ScriptedFeed::always(vec![sighting("iBeacon", "V1")]));

        let outcome = service.poll_once().await.unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Skipped {
                sequence: 1,
                reason: "no_gateway".to_string()
            }
        );
        let snapshot = service.snapshot();
        assert!(snapshot.annotations.is_empty());
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("batch contains no gateway sighting")
        );
    }

    #[tokio::test]
    async fn test_vessel_edit_refreshes_map() {
        let service = service(ScriptedFeed::always(dock_batch()));
        service.poll_once().await.unwrap();

        service
            .save_vessel(VesselInput {
                id: 0,
                name: "Unknown No More".to_string(),
                mac: "UNKNOWN".to_string(),
            })
            .await
            .unwrap();

        let snapshot = service.snapshot();
        assert_eq!(snapshot.annotations.len(), 2);
        assert_eq!(snapshot.annotations[1].vessel_name, "Unknown No More");
    }

    #[tokio::test]
    async fn test_create_vessel_is_retrievable() {
        let service = service(ScriptedFeed::always(Vec::new()));
        let created = assert_ok!(
            service
                .save_vessel(VesselInput {
                    id: 0,
                    name: CompanyName().fake(),
                    mac: "V2".to_string(),
                })
                .await
        );

        assert_eq!(created.id, 2);
        let vessels = service.list_vessels().await.unwrap();
        assert!(vessels.contains(&created));
    }

    #[tokio::test]
    async fn test_delete_location_in_use_rejected() {
        let service = service(ScriptedFeed::always(Vec::new()));
        let err = service.delete_location(1).await.unwrap_err();
        assert!(matches!(
            err,
            TrackingError::Domain(DomainError::ReferentialIntegrity(_))
        ));
        assert_eq!(service.list_locations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_readers_reports_orphans() {
        let service = service(ScriptedFeed::always(Vec::new()));
        service.store().save::<Location>(&[]).await.unwrap();

        let readers = service.list_readers().await.unwrap();
        assert!(matches!(
            readers[0],
            ReaderResolution::Orphaned {
                missing_location_id: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_restore_rebuilds_map_from_persisted_batch() {
        let service = service(ScriptedFeed::always(Vec::new()));
        service.store().save_batch(&dock_batch()).await.unwrap();

        service.restore().await.unwrap();
        let snapshot = service.snapshot();
        assert_eq!(snapshot.annotations.len(), 1);
        assert_eq!(snapshot.sequence, 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_new_snapshots() {
        let service = service(ScriptedFeed::always(dock_batch()));
        let mut rx = service.subscribe();

        service.poll_once().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().annotations.len(), 1);
    }
}
