//! Persistence error types.

use domain::models::TableKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Fixture fetch failed for {table}: {message}")]
    Fixture { table: TableKind, message: String },

    #[error("Malformed snapshot for {table}: {source}")]
    Serialization {
        table: TableKind,
        #[source]
        source: serde_json::Error,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
