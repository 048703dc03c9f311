//! Fixture sources used to seed tables that have never been persisted.

use async_trait::async_trait;
use domain::models::{Record, TableKind};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::error::StoreError;

#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Fetch the raw JSON array for a table.
    async fn fetch(&self, table: TableKind) -> Result<String, StoreError>;
}

/// Fetches `{base_url}/Location.json` and friends over HTTP.
#[derive(Clone)]
pub struct HttpFixtureSource {
    client: Client,
    base_url: String,
}

impl HttpFixtureSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Backend(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url_for(&self, file: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file)
    }
}

#[async_trait]
impl FixtureSource for HttpFixtureSource {
    async fn fetch(&self, table: TableKind) -> Result<String, StoreError> {
        let file = table.fixture_file().ok_or_else(|| StoreError::Fixture {
            table,
            message: "table has no fixture document".to_string(),
        })?;
        let url = self.url_for(file);
        debug!(%url, %table, "Fetching fixture");

        let fixture_error = |e: reqwest::Error| StoreError::Fixture {
            table,
            message: e.to_string(),
        };
        self.client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fixture_error)?
            .text()
            .await
            .map_err(fixture_error)
    }
}

/// Serves fixture documents from memory. Tables without a document seed empty.
#[derive(Debug, Clone, Default)]
pub struct StaticFixtureSource {
    documents: HashMap<TableKind, String>,
}

impl StaticFixtureSource {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers the raw JSON document for a table.
    pub fn with_document(mut self, table: TableKind, json: impl Into<String>) -> Self {
        self.documents.insert(table, json.into());
        self
    }

    /// Registers records for their table.
    pub fn with_records<T: Record>(self, records: &[T]) -> Self {
        let json = serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string());
        self.with_document(T::TABLE, json)
    }
}

#[async_trait]
impl FixtureSource for StaticFixtureSource {
    async fn fetch(&self, table: TableKind) -> Result<String, StoreError> {
        Ok(self
            .documents
            .get(&table)
            .cloned()
            .unwrap_or_else(|| "[]".to_string()))
    }
}
