//! Chat session: the message log owner.
//!
//! Holds the append-only log, the input draft, and the single-flight send
//! state. Accepting a send appends the user message, clears the draft and
//! moves `Idle -> Sending` in one critical section; the reply task moves it
//! back to `Idle` when the response source answers, fails, or times out.
//! Every event a send produces is published before the state returns to
//! `Idle`, so observers of `wait_idle` see the whole exchange.
//!
//! A session opened over a [`BoxHistoryStore`] starts from the most recent
//! page of recorded messages and records each message it appends.
//!
//! `ChatSession` is a cheap handle (`Clone` shares state). Sending spawns a
//! tokio task, so the send methods must be called inside a runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tianyi_types::chat::{
    ChatEvent, ChatMessage, MessageId, MessageKind, ReplyRequest, SendState,
};
use tianyi_types::config::ClientConfig;
use tianyi_types::error::{ResponseError, StorageError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::box_source::BoxResponseSource;
use super::events::ChatEventBus;
use super::history::BoxHistoryStore;

/// Construction options for a chat session.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Upper bound on one reply; on expiry the send fails and becomes retryable.
    pub reply_timeout: Duration,
    /// Assistant message placed at the top of a fresh log.
    pub greeting: Option<String>,
    /// Messages restored on open, and fetched per `load_older` call.
    pub history_page: usize,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(30),
            greeting: None,
            history_page: 20,
        }
    }
}

impl From<&ClientConfig> for ChatOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            reply_timeout: config.reply_timeout(),
            greeting: config.greeting.clone(),
            history_page: config.history_page_size,
        }
    }
}

struct ChatLog {
    messages: Vec<ChatMessage>,
    draft: String,
    next_id: MessageId,
    /// User message whose reply failed, eligible for `retry`.
    failed: Option<MessageId>,
}

impl ChatLog {
    /// Append a message with the next id.
    ///
    /// Timestamps never go backwards within the log and never precede
    /// `not_before`, even if the wall clock does.
    fn push(
        &mut self,
        kind: MessageKind,
        content: String,
        is_user: bool,
        not_before: i64,
    ) -> ChatMessage {
        let last = self.messages.last().map_or(i64::MIN, |m| m.timestamp);
        let message = ChatMessage {
            id: self.next_id,
            kind,
            content,
            is_user,
            timestamp: Utc::now().timestamp_millis().max(last).max(not_before),
        };
        self.next_id = self.next_id.next();
        self.messages.push(message.clone());
        message
    }
}

struct Inner {
    log: Mutex<ChatLog>,
    send_state: watch::Sender<SendState>,
    source: BoxResponseSource,
    history: Option<BoxHistoryStore>,
    events: ChatEventBus,
    reply_timeout: Duration,
    history_page: usize,
}

impl Inner {
    fn lock_log(&self) -> MutexGuard<'_, ChatLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_send(&self, message_id: MessageId) {
        self.send_state.send_replace(SendState::Sending {
            message_id,
            started_at: Utc::now(),
        });
    }

    /// Record a message; a failed write is logged and the chat carries on.
    async fn record(&self, message: &ChatMessage) {
        let Some(history) = &self.history else {
            return;
        };
        if let Err(e) = history.append(message).await {
            warn!(message_id = %message.id, error = %e, "failed to record chat message");
        }
    }
}

/// Owns the ordered message log and the single-flight send guard.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<Inner>,
}

impl ChatSession {
    /// A session with no history: the log starts empty (or with the greeting)
    /// and nothing is recorded.
    pub fn new(source: BoxResponseSource, options: ChatOptions) -> Self {
        Self::build(source, options, None, Vec::new())
    }

    /// A session that restores the latest page from `history` and records
    /// new messages there.
    ///
    /// Ids continue after the newest restored message. The greeting is only
    /// shown when nothing was restored, and is never recorded.
    pub async fn open(
        source: BoxResponseSource,
        options: ChatOptions,
        history: BoxHistoryStore,
    ) -> Result<Self, StorageError> {
        let mut restored = history.load(options.history_page, None).await?;
        restored.sort_by_key(|m| m.id);
        info!(restored = restored.len(), "chat history restored");
        Ok(Self::build(source, options, Some(history), restored))
    }

    fn build(
        source: BoxResponseSource,
        options: ChatOptions,
        history: Option<BoxHistoryStore>,
        restored: Vec<ChatMessage>,
    ) -> Self {
        let next_id = restored.last().map_or(MessageId(1), |m| m.id.next());
        let mut log = ChatLog {
            messages: restored,
            draft: String::new(),
            next_id,
            failed: None,
        };
        if log.messages.is_empty() {
            if let Some(greeting) = options.greeting {
                log.push(MessageKind::Text, greeting, false, i64::MIN);
            }
        }

        let (send_state, _) = watch::channel(SendState::Idle);
        Self {
            inner: Arc::new(Inner {
                log: Mutex::new(log),
                send_state,
                source,
                history,
                events: ChatEventBus::default(),
                reply_timeout: options.reply_timeout,
                history_page: options.history_page,
            }),
        }
    }

    // --- Presentation surface ---

    /// The log in display order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.lock_log().messages.clone()
    }

    pub fn draft(&self) -> String {
        self.inner.lock_log().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.inner.lock_log().draft = text.into();
    }

    pub fn send_state(&self) -> SendState {
        self.inner.send_state.borrow().clone()
    }

    pub fn send_in_flight(&self) -> bool {
        !self.inner.send_state.borrow().is_idle()
    }

    /// Draft has visible text and no reply is outstanding.
    pub fn can_send(&self) -> bool {
        let log = self.inner.lock_log();
        !log.draft.trim().is_empty() && !self.send_in_flight()
    }

    pub fn can_send_image(&self) -> bool {
        !self.send_in_flight()
    }

    /// User message whose reply failed, if `retry` would resend one.
    pub fn failed_message(&self) -> Option<MessageId> {
        self.inner.lock_log().failed
    }

    /// Name of the response source replies come from.
    pub fn source_name(&self) -> &str {
        self.inner.source.name()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.inner.events.subscribe()
    }

    /// Resolve once no send is in flight.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.send_state.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = rx.wait_for(SendState::is_idle).await;
    }

    /// Prepend the page of recorded messages just before the oldest one in
    /// the log. Returns the page; empty once the start is reached or when
    /// the session has no history.
    pub async fn load_older(&self) -> Result<Vec<ChatMessage>, StorageError> {
        let Some(history) = &self.inner.history else {
            return Ok(Vec::new());
        };
        let Some(oldest) = self.inner.lock_log().messages.first().map(|m| m.id) else {
            return Ok(Vec::new());
        };

        let mut page = history.load(self.inner.history_page, Some(oldest)).await?;
        page.sort_by_key(|m| m.id);

        let mut log = self.inner.lock_log();
        // Another handle may have prepended the same page meanwhile.
        let first = log.messages.first().map_or(oldest, |m| m.id);
        page.retain(|m| m.id < first);
        let newer = std::mem::replace(&mut log.messages, page.clone());
        log.messages.extend(newer);
        debug!(loaded = page.len(), "older chat history loaded");
        Ok(page)
    }

    // --- Intents ---

    /// Send a text message.
    ///
    /// Returns false, changing nothing, when a reply is still in flight or
    /// the text is blank.
    pub fn append_user_text(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.submit(MessageKind::Text, text.to_string(), true)
    }

    /// Send the draft as a text message.
    pub fn send_draft(&self) -> bool {
        let draft = self.draft();
        self.append_user_text(&draft)
    }

    /// Send an image by locator. The draft is left as typed.
    pub fn append_user_image(&self, locator: &str) -> bool {
        let locator = locator.trim();
        if locator.is_empty() {
            return false;
        }
        self.submit(MessageKind::Image, locator.to_string(), false)
    }

    /// Resend the user message whose reply last failed.
    ///
    /// The message is not appended again. Returns false when nothing failed
    /// or a send is already in flight.
    pub fn retry(&self) -> bool {
        let request = {
            let mut log = self.inner.lock_log();
            if self.send_in_flight() {
                return false;
            }
            let Some(failed_id) = log.failed.take() else {
                return false;
            };
            let Some(pos) = log.messages.iter().position(|m| m.id == failed_id) else {
                return false;
            };
            self.inner.begin_send(failed_id);
            ReplyRequest {
                message: log.messages[pos].clone(),
                history: log.messages[..pos].to_vec(),
            }
        };

        info!(message_id = %request.message.id, "retrying reply");
        self.inner
            .events
            .publish(ChatEvent::SendStateChanged { in_flight: true });
        // Already recorded by the original send.
        self.dispatch(request, false);
        true
    }

    fn submit(&self, kind: MessageKind, content: String, clear_draft: bool) -> bool {
        let request = {
            let mut log = self.inner.lock_log();
            if self.send_in_flight() {
                debug!(%kind, "send rejected, reply still in flight");
                return false;
            }
            let message = log.push(kind, content, true, i64::MIN);
            if clear_draft {
                log.draft.clear();
            }
            log.failed = None;
            self.inner.begin_send(message.id);
            let history = log.messages[..log.messages.len() - 1].to_vec();
            ReplyRequest { message, history }
        };

        debug!(message_id = %request.message.id, %kind, "user message accepted");
        self.inner
            .events
            .publish(ChatEvent::MessageAppended(request.message.clone()));
        self.inner
            .events
            .publish(ChatEvent::SendStateChanged { in_flight: true });
        self.dispatch(request, true);
        true
    }

    fn dispatch(&self, request: ReplyRequest, record_request: bool) {
        let session = self.clone();
        tokio::spawn(async move { session.await_reply(request, record_request).await });
    }

    async fn await_reply(&self, request: ReplyRequest, record_request: bool) {
        let message_id = request.message.id;
        let timeout = self.inner.reply_timeout;

        if record_request {
            self.inner.record(&request.message).await;
        }

        let result = match tokio::time::timeout(timeout, self.inner.source.respond(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(ResponseError::Timeout(timeout)),
        };

        match result {
            Ok(reply) => {
                let message = self.inner.lock_log().push(
                    reply.kind,
                    reply.content,
                    false,
                    request.message.timestamp,
                );
                debug!(%message_id, reply_id = %message.id, "reply appended");
                self.inner
                    .events
                    .publish(ChatEvent::MessageAppended(message.clone()));
                self.inner.record(&message).await;
            }
            Err(error) => {
                warn!(%message_id, %error, source = self.inner.source.name(), "reply failed");
                self.inner.lock_log().failed = Some(message_id);
                self.inner
                    .events
                    .publish(ChatEvent::SendFailed { message_id, error });
            }
        }

        self.inner
            .events
            .publish(ChatEvent::SendStateChanged { in_flight: false });
        self.inner.send_state.send_replace(SendState::Idle);
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("source", &self.inner.source)
            .field("history", &self.inner.history.is_some())
            .field("send_state", &self.send_state())
            .finish()
    }
}
