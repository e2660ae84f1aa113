//! Client configuration types.
//!
//! `ClientConfig` represents the `config.toml` in the data directory. Every
//! field has a default, so an empty or missing file yields a working client.

use serde::{Deserialize, Serialize};

use std::time::Duration;

/// Top-level configuration for the client core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Simulated round-trip latency of login and registration.
    #[serde(default = "default_auth_latency_ms")]
    pub auth_latency_ms: u64,

    /// Delay before the local response source answers.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Upper bound on a single reply. A stalled source is abandoned after this.
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,

    /// Text returned by the local response source.
    #[serde(default = "default_reply_text")]
    pub reply_text: String,

    /// Assistant message seeded into a fresh chat log. `None` starts empty.
    #[serde(default = "default_greeting")]
    pub greeting: Option<String>,

    /// Messages restored from history when a chat opens, and per older page.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,

    /// Re-authenticate saved credentials at startup instead of trusting the
    /// stored auto-login flag.
    #[serde(default)]
    pub verify_on_startup: bool,

    /// Seal the saved password with the local vault key before storing it.
    #[serde(default = "default_true")]
    pub encrypt_credentials: bool,

    /// Where the vault key lives when `encrypt_credentials` is set.
    #[serde(default)]
    pub vault_key: VaultKeySource,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_auth_latency_ms() -> u64 {
    500
}

fn default_reply_delay_ms() -> u64 {
    1000
}

fn default_reply_timeout_secs() -> u64 {
    30
}

fn default_reply_text() -> String {
    "I received your message~".to_string()
}

fn default_greeting() -> Option<String> {
    Some("Hello! I'm Luo Tianyi.".to_string())
}

fn default_history_page_size() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl ClientConfig {
    pub fn auth_latency(&self) -> Duration {
        Duration::from_millis(self.auth_latency_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Reply timeout, never shorter than one second.
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs.max(1))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_latency_ms: default_auth_latency_ms(),
            reply_delay_ms: default_reply_delay_ms(),
            reply_timeout_secs: default_reply_timeout_secs(),
            reply_text: default_reply_text(),
            greeting: default_greeting(),
            history_page_size: default_history_page_size(),
            verify_on_startup: false,
            encrypt_credentials: true,
            vault_key: VaultKeySource::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Storage location of the credential vault key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultKeySource {
    /// `vault.key` in the data directory. Never prompts.
    #[default]
    File,
    /// The OS keychain. May prompt for authorization on some platforms.
    Keychain,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging options consumed by the observe crate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// Bridge spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,

    /// Default filter directive when `RUST_LOG` is unset (e.g. "info").
    #[serde(default)]
    pub filter: Option<String>,
}
