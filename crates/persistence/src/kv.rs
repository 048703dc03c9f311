//! Key-value store collaborator.
//!
//! Values are JSON documents stored as text; the store never inspects them.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::metrics::KvTimer;
use crate::repositories::KvEntryRepository;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Short backend name used in logs and metrics.
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites the value under `key` in a single write.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let timer = KvTimer::new(self.backend(), "get");
        let value = self.entries.read().await.get(key).cloned();
        timer.record();
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let timer = KvTimer::new(self.backend(), "set");
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        timer.record();
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let timer = KvTimer::new(self.backend(), "delete");
        let existed = self.entries.write().await.remove(key).is_some();
        timer.record();
        Ok(existed)
    }
}

#[async_trait]
impl KeyValueStore for KvEntryRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_value(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.upsert(key, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(KvEntryRepository::delete(self, key).await?)
    }
}
