//! Broadcast event bus for distributing `ChatEvent` to the presentation layer.
//!
//! Built on `tokio::sync::broadcast`. Publishing with no active subscribers
//! is a no-op; a slow subscriber that lags only loses its own backlog.

use tianyi_types::chat::ChatEvent;
use tokio::sync::broadcast;

/// Default channel capacity. A chat produces a handful of events per send.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Multi-consumer bus for chat events.
#[derive(Clone)]
pub struct ChatEventBus {
    sender: broadcast::Sender<ChatEvent>,
}

impl ChatEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ChatEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for ChatEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl std::fmt::Debug for ChatEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
