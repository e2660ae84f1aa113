//! Key-value store trait.

use std::future::Future;
use std::sync::Arc;

use tianyi_types::error::StorageError;

/// Durable storage for small string values, surviving process restarts.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// There is no transactional guarantee across keys: each call stands alone.
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Set a value for a key (upsert).
    fn set(&self, key: &str, value: &str)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove a key. No-op if the key does not exist.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl<T: KvStore> KvStore for Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).remove(key)
    }
}
