//! In-process key-value store.
//!
//! Backs ephemeral runs (`--ephemeral` in the CLI) where nothing should
//! touch the data directory. Contents vanish with the process.

use std::collections::HashMap;

use tianyi_core::storage::kv_store::KvStore;
use tianyi_types::error::StorageError;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
