//! Sighting feed client.

use async_trait::async_trait;
use domain::models::BeaconSighting;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while fetching a sighting batch.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed responded with status {0}")]
    Status(u16),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid sighting batch: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FeedError {
    /// Label used for the `feed_ticks_total` outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_error",
            Self::Status(_) => "bad_status",
            Self::Timeout(_) => "timeout",
            Self::Decode(_) => "decode_error",
        }
    }
}

/// Source of sighting batches.
#[async_trait]
pub trait BeaconFeed: Send + Sync {
    /// Fetch the batch for request number `sequence`.
    async fn fetch(&self, sequence: u64) -> Result<Vec<BeaconSighting>, FeedError>;
}

/// Polls a JSON document over HTTP, defeating caches with `?i={sequence}`.
#[derive(Clone)]
pub struct HttpBeaconFeed {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpBeaconFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    async fn fetch_inner(&self, sequence: u64) -> Result<Vec<BeaconSighting>, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("i", sequence)])
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl BeaconFeed for HttpBeaconFeed {
    async fn fetch(&self, sequence: u64) -> Result<Vec<BeaconSighting>, FeedError> {
        debug!(sequence, url = %self.url, "Fetching sighting batch");
        tokio::time::timeout(self.timeout, self.fetch_inner(sequence))
            .await
            .map_err(|_| FeedError::Timeout(self.timeout.as_millis() as u64))?
    }
}
