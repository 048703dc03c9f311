//! Scripted feed for tests and local demos.

use async_trait::async_trait;
use domain::models::BeaconSighting;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{BeaconFeed, FeedError};

/// Returns a fixed batch for every request, with optional per-sequence
/// delays and failures.
#[derive(Clone, Default)]
pub struct ScriptedFeed {
    batch: Arc<Mutex<Vec<BeaconSighting>>>,
    delays: HashMap<u64, Duration>,
    failures: HashSet<u64>,
    requested: Arc<Mutex<Vec<u64>>>,
}

impl ScriptedFeed {
    pub fn always(batch: Vec<BeaconSighting>) -> Self {
        Self {
            batch: Arc::new(Mutex::new(batch)),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, sequence: u64, delay: Duration) -> Self {
        self.delays.insert(sequence, delay);
        self
    }

    /// Answer request `sequence` with a 503.
    pub fn failing_on(mut self, sequence: u64) -> Self {
        self.failures.insert(sequence);
        self
    }

    /// Sequence numbers seen so far, in request order.
    pub fn requested(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.requested)
    }

    /// Swap the batch served to later requests.
    pub async fn replace_batch(&self, batch: Vec<BeaconSighting>) {
        *self.batch.lock().await = batch;
    }
}

#[async_trait]
impl BeaconFeed for ScriptedFeed {
    async fn fetch(&self, sequence: u64) -> Result<Vec<BeaconSighting>, FeedError> {
        self.requested.lock().await.push(sequence);

        if let Some(delay) = self.delays.get(&sequence) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(&sequence) {
            return Err(FeedError::Status(503));
        }

        Ok(self.batch.lock().await.clone())
    }
}
