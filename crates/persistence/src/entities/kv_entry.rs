//! Key-value entry entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the kv_entries table.
#[derive(Debug, Clone, FromRow)]
pub struct KvEntryEntity {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
