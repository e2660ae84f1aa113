//! SQLite chat history.
//!
//! Implements `HistoryStore` over the `chat_messages` table. Each store is
//! bound to one owner (the logged-in username), so accounts sharing a data
//! directory keep separate conversations.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tianyi_core::chat::history::HistoryStore;
use tianyi_types::chat::{ChatMessage, MessageId, MessageKind};
use tianyi_types::error::StorageError;

use super::kv::query_error;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryStore` for one owner.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: DatabasePool,
    owner: String,
}

impl SqliteHistoryStore {
    pub fn new(pool: DatabasePool, owner: impl Into<String>) -> Self {
        Self {
            pool,
            owner: owner.into(),
        }
    }
}

fn to_sql_id(id: MessageId) -> i64 {
    i64::try_from(id.0).unwrap_or(i64::MAX)
}

fn row_to_message(row: &SqliteRow) -> Result<ChatMessage, StorageError> {
    let id: i64 = row.try_get("id").map_err(query_error)?;
    let kind: String = row.try_get("kind").map_err(query_error)?;
    Ok(ChatMessage {
        id: MessageId(u64::try_from(id).map_err(|e| StorageError::Query(e.to_string()))?),
        kind: kind.parse::<MessageKind>().map_err(StorageError::Query)?,
        content: row.try_get("content").map_err(query_error)?,
        is_user: row.try_get("is_user").map_err(query_error)?,
        timestamp: row.try_get("timestamp").map_err(query_error)?,
    })
}

impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), StorageError> {
        sqlx::query(
            r#"INSERT INTO chat_messages (owner, id, kind, content, is_user, timestamp)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&self.owner)
        .bind(to_sql_id(message.id))
        .bind(message.kind.to_string())
        .bind(&message.content)
        .bind(message.is_user)
        .bind(message.timestamp)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        tracing::debug!(owner = %self.owner, message_id = %message.id, "chat message recorded");
        Ok(())
    }

    async fn load(
        &self,
        count: usize,
        before: Option<MessageId>,
    ) -> Result<Vec<ChatMessage>, StorageError> {
        let before = before.map_or(i64::MAX, to_sql_id);
        let limit = i64::try_from(count).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            r#"SELECT id, kind, content, is_user, timestamp FROM chat_messages
               WHERE owner = ? AND id < ?
               ORDER BY id DESC
               LIMIT ?"#,
        )
        .bind(&self.owner)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = rows
            .iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }
}
