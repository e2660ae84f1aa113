//! Fixed-reply response source.
//!
//! Ignores the message content and answers with the configured text after
//! the configured delay. Images are acknowledged the same way as text.

use std::time::Duration;

use tianyi_core::chat::source::ResponseSource;
use tianyi_types::chat::{Reply, ReplyRequest};
use tianyi_types::config::ClientConfig;
use tianyi_types::error::ResponseError;

#[derive(Debug, Clone)]
pub struct EchoResponseSource {
    delay: Duration,
    reply_text: String,
}

impl EchoResponseSource {
    pub fn new(delay: Duration, reply_text: impl Into<String>) -> Self {
        Self {
            delay,
            reply_text: reply_text.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.reply_delay(), config.reply_text.clone())
    }
}

impl ResponseSource for EchoResponseSource {
    fn name(&self) -> &str {
        "echo"
    }

    async fn respond(&self, request: &ReplyRequest) -> Result<Reply, ResponseError> {
        tokio::time::sleep(self.delay).await;
        tracing::debug!(
            message_id = %request.message.id,
            kind = %request.message.kind,
            history = request.history.len(),
            "echo reply ready"
        );
        Ok(Reply::text(self.reply_text.clone()))
    }
}
