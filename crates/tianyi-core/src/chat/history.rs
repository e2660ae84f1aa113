//! Conversation history port.
//!
//! A chat session records every message it appends and restores the most
//! recent page when it opens. Older pages are fetched on demand, newest
//! page first, each page returned in log order.

use std::future::Future;
use std::pin::Pin;

use tianyi_types::chat::{ChatMessage, MessageId};
use tianyi_types::error::StorageError;

/// Durable record of chat messages.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in tianyi-infra.
pub trait HistoryStore: Send + Sync {
    /// Record a message. Ids are unique per conversation.
    fn append(&self, message: &ChatMessage)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Up to `count` messages with ids below `before` (all messages when
    /// `None`), closest to `before` first selected, returned in ascending id
    /// order.
    fn load(
        &self,
        count: usize,
        before: Option<MessageId>,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, StorageError>> + Send;
}

/// Object-safe version of [`HistoryStore`] with boxed futures.
pub trait HistoryStoreDyn: Send + Sync {
    fn append_boxed<'a>(
        &'a self,
        message: &'a ChatMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + 'a>>;

    fn load_boxed(
        &self,
        count: usize,
        before: Option<MessageId>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ChatMessage>, StorageError>> + Send + '_>>;
}

impl<T: HistoryStore> HistoryStoreDyn for T {
    fn append_boxed<'a>(
        &'a self,
        message: &'a ChatMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + 'a>> {
        Box::pin(self.append(message))
    }

    fn load_boxed(
        &self,
        count: usize,
        before: Option<MessageId>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ChatMessage>, StorageError>> + Send + '_>> {
        Box::pin(self.load(count, before))
    }
}

/// Type-erased history store.
pub struct BoxHistoryStore {
    inner: Box<dyn HistoryStoreDyn + Send + Sync>,
}

impl BoxHistoryStore {
    pub fn new<T: HistoryStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub async fn append(&self, message: &ChatMessage) -> Result<(), StorageError> {
        self.inner.append_boxed(message).await
    }

    pub async fn load(
        &self,
        count: usize,
        before: Option<MessageId>,
    ) -> Result<Vec<ChatMessage>, StorageError> {
        self.inner.load_boxed(count, before).await
    }
}

impl std::fmt::Debug for BoxHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxHistoryStore").finish_non_exhaustive()
    }
}
