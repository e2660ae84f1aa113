//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `tianyi-core` using sqlx with split read/write
//! pools. Values are stored verbatim.

use chrono::Utc;
use sqlx::Row;
use tianyi_core::storage::kv_store::KvStore;
use tianyi_types::error::StorageError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// All stored keys, sorted.
    #[cfg(test)]
    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT key FROM client_kv ORDER BY key")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| row.try_get("key").map_err(query_error))
            .collect()
    }
}

pub(super) fn query_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::Connection
        }
        other => StorageError::Query(other.to_string()),
    }
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM client_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| row.try_get("value").map_err(query_error))
            .transpose()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO client_kv (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        tracing::debug!(key, "kv entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM client_kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        tracing::debug!(key, "kv entry removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::database_url;
    use tempfile::TempDir;

    async fn test_store() -> (SqliteKvStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path())).await.unwrap();
        (SqliteKvStore::new(pool), dir)
    }

    #[tokio::test]
    async fn test_set_get() {
        let (store, _dir) = test_store().await;

        store.set("saved_username", "tom").await.unwrap();
        assert_eq!(
            store.get("saved_username").await.unwrap(),
            Some("tom".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let (store, _dir) = test_store().await;
        assert!(store.get("auth_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let (store, _dir) = test_store().await;

        store.set("auth_token", "first").await.unwrap();
        store.set("auth_token", "second").await.unwrap();

        assert_eq!(
            store.get("auth_token").await.unwrap(),
            Some("second".to_string())
        );
        assert_eq!(store.keys().await.unwrap(), vec!["auth_token"]);
    }

    #[tokio::test]
    async fn test_remove_and_remove_missing() {
        let (store, _dir) = test_store().await;

        store.set("auto_login", "true").await.unwrap();
        store.remove("auto_login").await.unwrap();
        assert!(store.get("auto_login").await.unwrap().is_none());

        // Removing again is a no-op.
        store.remove("auto_login").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_value_is_distinct_from_absent() {
        let (store, _dir) = test_store().await;

        store.set("saved_password", "").await.unwrap();
        assert_eq!(
            store.get("saved_password").await.unwrap(),
            Some(String::new())
        );
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());

        {
            let pool = DatabasePool::new(&url).await.unwrap();
            let store = SqliteKvStore::new(pool.clone());
            store.set("auto_login", "true").await.unwrap();
            store.set("saved_username", "tom").await.unwrap();
            pool.close().await;
        }

        let store = SqliteKvStore::new(DatabasePool::new(&url).await.unwrap());
        assert_eq!(
            store.get("auto_login").await.unwrap(),
            Some("true".to_string())
        );
        assert_eq!(
            store.keys().await.unwrap(),
            vec!["auto_login", "saved_username"]
        );
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_error() {
        let (store, _dir) = test_store().await;
        store.pool.close().await;

        let err = store.get("auth_token").await.unwrap_err();
        assert_eq!(err, StorageError::Connection);
    }
}
