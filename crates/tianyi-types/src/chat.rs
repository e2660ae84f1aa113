//! Chat message types.
//!
//! Messages are immutable once created and live in a single append-only log
//! owned by the chat session. Ids increase strictly in creation order, so
//! sorting by id reproduces display order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::ResponseError;

/// Identifier of a chat message, strictly increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a message's `content` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Literal text.
    #[default]
    Text,
    /// An image locator (path or URI).
    Image,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Image => write!(f, "image"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

/// A single entry in the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub kind: MessageKind,
    pub content: String,
    pub is_user: bool,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    /// Creation time as a `DateTime`, falling back to the epoch for
    /// out-of-range timestamps.
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }
}

/// Reply content produced by a response source.
///
/// The chat session stamps it with an id and timestamp when it is appended,
/// which keeps id assignment in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub kind: MessageKind,
    pub content: String,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: content.into(),
        }
    }
}

/// What a response source receives: the triggering user message and the log
/// that preceded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub message: ChatMessage,
    pub history: Vec<ChatMessage>,
}

/// Single-flight send state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SendState {
    #[default]
    Idle,
    Sending {
        message_id: MessageId,
        started_at: DateTime<Utc>,
    },
}

impl SendState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SendState::Idle)
    }
}

/// Notifications published by the chat session for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    MessageAppended(ChatMessage),
    SendStateChanged { in_flight: bool },
    /// The response source timed out or failed; `retry` resends `message_id`.
    SendFailed {
        message_id: MessageId,
        error: ResponseError,
    },
}
