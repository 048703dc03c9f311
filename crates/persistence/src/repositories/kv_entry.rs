//! Key-value entry repository for database operations.

use sqlx::PgPool;

use crate::entities::KvEntryEntity;
use crate::metrics::KvTimer;

const BACKEND: &str = "postgres";

/// Repository for kv_entries database operations.
#[derive(Clone)]
pub struct KvEntryRepository {
    pool: PgPool,
}

impl KvEntryRepository {
    /// Creates a new KvEntryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the raw JSON text stored under a key.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let timer = KvTimer::new(BACKEND, "get");
        let result = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value::text
            FROM kv_entries
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert or replace the value stored under a key.
    pub async fn upsert(&self, key: &str, value: &str) -> Result<KvEntryEntity, sqlx::Error> {
        let timer = KvTimer::new(BACKEND, "set");
        let result = sqlx::query_as::<_, KvEntryEntity>(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES ($1, $2::jsonb, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a key. Returns whether a row was removed.
    pub async fn delete(&self, key: &str) -> Result<bool, sqlx::Error> {
        let timer = KvTimer::new(BACKEND, "delete");
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
