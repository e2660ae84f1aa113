//! Renders chat messages and events to the terminal.
//!
//! Lines typed by the user are already echoed by readline, so live user text
//! messages are not printed again. Restored history goes through
//! `transcript`, which prints both sides.

use std::io::Write;

use chrono::Local;
use console::style;
use tianyi_types::chat::{ChatEvent, ChatMessage, MessageKind};
use tokio::sync::{broadcast, oneshot};

pub struct ChatRenderer<W: Write> {
    out: W,
    assistant: String,
}

impl<W: Write> ChatRenderer<W> {
    pub fn new(out: W, assistant: impl Into<String>) -> Self {
        Self {
            out,
            assistant: assistant.into(),
        }
    }

    pub fn message(&mut self, message: &ChatMessage) {
        let time = message.created_at().with_timezone(&Local).format("%H:%M");
        let line = match (message.is_user, message.kind) {
            (true, MessageKind::Text) => return,
            (true, MessageKind::Image) => format!(
                "  {} {} {}",
                style(time).dim(),
                style("[image]").magenta(),
                message.content
            ),
            (false, MessageKind::Text) => format!(
                "  {} {} {}",
                style(time).dim(),
                style(format!("{}:", self.assistant)).cyan().bold(),
                message.content
            ),
            (false, MessageKind::Image) => format!(
                "  {} {} {} {}",
                style(time).dim(),
                style(format!("{}:", self.assistant)).cyan().bold(),
                style("[image]").magenta(),
                message.content
            ),
        };
        let _ = writeln!(self.out, "{line}");
    }

    /// Print a recorded message, including the user's own text.
    pub fn transcript(&mut self, message: &ChatMessage) {
        if message.is_user && message.kind == MessageKind::Text {
            let time = message.created_at().with_timezone(&Local).format("%H:%M");
            let _ = writeln!(
                self.out,
                "  {} {} {}",
                style(time).dim(),
                style("you:").green().bold(),
                message.content
            );
        } else {
            self.message(message);
        }
    }

    pub fn event(&mut self, event: &ChatEvent) {
        match event {
            ChatEvent::MessageAppended(message) => self.message(message),
            ChatEvent::SendStateChanged { in_flight: true } => {
                self.notice(&format!("{} is typing...", self.assistant));
            }
            ChatEvent::SendStateChanged { in_flight: false } => {}
            ChatEvent::SendFailed { error, .. } => {
                let _ = writeln!(
                    self.out,
                    "  {} {error}. Type {} to resend.",
                    style("✗").red().bold(),
                    style("/retry").yellow()
                );
            }
        }
    }

    pub fn notice(&mut self, text: &str) {
        let _ = writeln!(self.out, "  {}", style(text).dim());
    }

    /// Render events until the bus closes or `shutdown` fires.
    ///
    /// On shutdown, events already queued are rendered before returning, so
    /// the last reply is never cut off. Returns the writer.
    pub async fn run(
        mut self,
        mut events: broadcast::Receiver<ChatEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> W {
        loop {
            tokio::select! {
                biased;
                received = events.recv() => match received {
                    Ok(event) => self.event(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "chat renderer lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => return self.out,
                },
                _ = &mut shutdown => break,
            }
        }

        loop {
            match events.try_recv() {
                Ok(event) => self.event(&event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "chat renderer lagged behind");
                }
                Err(_) => break,
            }
        }
        self.out
    }
}
