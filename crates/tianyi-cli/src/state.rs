//! Application state wiring the services together.
//!
//! The core services are generic over their ports; `AppState` pins them to
//! the infra implementations selected by the config and CLI flags.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tianyi_core::auth::box_authenticator::BoxAuthenticator;
use tianyi_core::auth::cipher::{CredentialCipher, PlaintextCipher};
use tianyi_core::auth::manager::SessionManager;
use tianyi_core::chat::box_source::BoxResponseSource;
use tianyi_core::chat::history::BoxHistoryStore;
use tianyi_core::chat::session::{ChatOptions, ChatSession};
use tianyi_core::storage::kv_store::KvStore;
use tianyi_infra::config::VAULT_KEY_FILE;
use tianyi_infra::crypto::cipher::VaultCredentialCipher;
use tianyi_infra::crypto::vault::VaultCrypto;
use tianyi_infra::memory::MemoryKvStore;
use tianyi_infra::remote::echo::EchoResponseSource;
use tianyi_infra::remote::simulated::SimulatedAuthenticator;
use tianyi_infra::sqlite::history::SqliteHistoryStore;
use tianyi_infra::sqlite::kv::SqliteKvStore;
use tianyi_infra::sqlite::pool::{DatabasePool, database_url};
use tianyi_types::config::{ClientConfig, VaultKeySource};
use tianyi_types::error::StorageError;

/// The store backing the session manager: durable or in-memory.
pub enum ClientStore {
    Sqlite(SqliteKvStore),
    Memory(MemoryKvStore),
}

impl ClientStore {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Memory(_) => "memory",
        }
    }
}

impl KvStore for ClientStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Sqlite(store) => store.get(key).await,
            Self::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Sqlite(store) => store.set(key, value).await,
            Self::Memory(store) => store.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Sqlite(store) => store.remove(key).await,
            Self::Memory(store) => store.remove(key).await,
        }
    }
}

pub type ConcreteSessionManager = SessionManager<ClientStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<ConcreteSessionManager>,
    pub config: ClientConfig,
    pub data_dir: PathBuf,
    pub db_pool: Option<DatabasePool>,
}

impl AppState {
    /// Open storage and wire services.
    ///
    /// With `ephemeral` nothing under `data_dir` is created or written and
    /// the saved password is kept in plaintext memory.
    pub async fn init(
        data_dir: PathBuf,
        config: ClientConfig,
        ephemeral: bool,
    ) -> anyhow::Result<Self> {
        let (store, db_pool, cipher) = if ephemeral {
            let cipher: Arc<dyn CredentialCipher> = Arc::new(PlaintextCipher);
            (ClientStore::Memory(MemoryKvStore::new()), None, cipher)
        } else {
            tokio::fs::create_dir_all(&data_dir)
                .await
                .with_context(|| format!("failed to create {}", data_dir.display()))?;

            let db_pool = DatabasePool::new(&database_url(&data_dir))
                .await
                .context("failed to open client database")?;

            (
                ClientStore::Sqlite(SqliteKvStore::new(db_pool.clone())),
                Some(db_pool),
                credential_cipher(&data_dir, &config)?,
            )
        };

        let authenticator =
            BoxAuthenticator::new(SimulatedAuthenticator::new(config.auth_latency()));
        let sessions = SessionManager::new(store, authenticator, cipher)
            .with_verify_on_startup(config.verify_on_startup);

        tracing::debug!(
            data_dir = %data_dir.display(),
            store = sessions.store().kind(),
            "application state ready"
        );

        Ok(Self {
            sessions: Arc::new(sessions),
            config,
            data_dir,
            db_pool,
        })
    }

    /// Chat session for `username`.
    ///
    /// With a database open, the session restores that account's recorded
    /// history and records new messages. If the history cannot be read the
    /// chat starts fresh and unrecorded.
    pub async fn open_chat(&self, username: &str) -> ChatSession {
        let source = || BoxResponseSource::new(EchoResponseSource::from_config(&self.config));
        let options = ChatOptions::from(&self.config);

        let Some(pool) = &self.db_pool else {
            return ChatSession::new(source(), options);
        };
        let history = BoxHistoryStore::new(SqliteHistoryStore::new(pool.clone(), username));
        match ChatSession::open(source(), options.clone(), history).await {
            Ok(chat) => chat,
            Err(e) => {
                tracing::warn!(%username, error = %e, "chat history unavailable, starting without it");
                ChatSession::new(source(), options)
            }
        }
    }

    /// Close the database so the WAL is checkpointed before exit.
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.db_pool {
            pool.close().await;
        }
    }
}

fn credential_cipher(
    data_dir: &std::path::Path,
    config: &ClientConfig,
) -> anyhow::Result<Arc<dyn CredentialCipher>> {
    if !config.encrypt_credentials {
        return Ok(Arc::new(PlaintextCipher));
    }

    // The key file avoids a keychain authorization prompt on every invocation.
    let vault = match config.vault_key {
        VaultKeySource::File => VaultCrypto::from_key_file(&data_dir.join(VAULT_KEY_FILE))
            .context("failed to load credential vault key")?,
        VaultKeySource::Keychain => {
            VaultCrypto::from_keychain().context("failed to load vault key from keychain")?
        }
    };
    Ok(Arc::new(VaultCredentialCipher::new(Arc::new(vault))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tianyi_types::credential::{AUTO_LOGIN_KEY, SAVED_PASSWORD_KEY};

    fn fast_config() -> ClientConfig {
        ClientConfig {
            auth_latency_ms: 0,
            reply_delay_ms: 0,
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn test_ephemeral_state_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let state = AppState::init(data_dir.clone(), fast_config(), true)
            .await
            .unwrap();
        state.sessions.login("tom", "pw123", true).await.unwrap();

        assert!(!data_dir.exists());
        assert_eq!(state.sessions.store().kind(), "memory");
    }

    #[tokio::test]
    async fn test_remembered_login_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();

        let first = AppState::init(data_dir.clone(), fast_config(), false)
            .await
            .unwrap();
        first.sessions.login("tom", "pw123", true).await.unwrap();

        let sealed = first
            .sessions
            .store()
            .get(SAVED_PASSWORD_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(sealed, "pw123", "password is sealed at rest");
        assert!(data_dir.join(VAULT_KEY_FILE).exists());
        first.shutdown().await;

        let second = AppState::init(data_dir, fast_config(), false)
            .await
            .unwrap();
        let state = second.sessions.initialize().await;
        assert_eq!(state.username(), Some("tom"));
        assert_eq!(
            second.sessions.store().get(AUTO_LOGIN_KEY).await.unwrap(),
            Some("true".to_string())
        );
    }

    #[tokio::test]
    async fn test_plaintext_when_encryption_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            encrypt_credentials: false,
            ..fast_config()
        };

        let state = AppState::init(dir.path().to_path_buf(), config, false)
            .await
            .unwrap();
        state.sessions.login("tom", "pw123", true).await.unwrap();

        assert_eq!(
            state.sessions.store().get(SAVED_PASSWORD_KEY).await.unwrap(),
            Some("pw123".to_string())
        );
        assert!(!dir.path().join(VAULT_KEY_FILE).exists());
    }

    #[tokio::test]
    async fn test_chat_history_restored_per_account() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();

        let first = AppState::init(data_dir.clone(), fast_config(), false)
            .await
            .unwrap();
        let chat = first.open_chat("tom").await;
        assert!(chat.append_user_text("remember me"));
        chat.wait_idle().await;
        let before: Vec<_> = chat.messages().into_iter().map(|m| m.id).collect();
        first.shutdown().await;

        let second = AppState::init(data_dir, fast_config(), false)
            .await
            .unwrap();
        let restored = second.open_chat("tom").await;
        let messages = restored.messages();
        assert_eq!(messages.len(), 2, "greeting is not recorded");
        assert_eq!(messages[0].content, "remember me");
        assert_eq!(messages[1].id, *before.last().unwrap());

        let other = second.open_chat("ann").await;
        assert!(other.messages().iter().all(|m| !m.is_user));
    }

    #[tokio::test]
    async fn test_ephemeral_chat_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init(dir.path().join("data"), fast_config(), true)
            .await
            .unwrap();

        let chat = state.open_chat("tom").await;
        assert!(chat.append_user_text("hi"));
        chat.wait_idle().await;

        let again = state.open_chat("tom").await;
        assert!(again.messages().iter().all(|m| !m.is_user));
        assert!(again.load_older().await.unwrap().is_empty());
    }
}
