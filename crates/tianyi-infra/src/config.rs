//! Client configuration and data directory resolution.
//!
//! Reads `config.toml` from the data directory (`~/.tianyi/` by default)
//! into [`ClientConfig`]. Falls back to defaults when the file is missing or
//! malformed: a broken config never keeps the client from starting.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tianyi_types::config::ClientConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TIANYI_DATA_DIR";

pub const CONFIG_FILE: &str = "config.toml";

/// File holding the credential vault key when the keychain is not used.
pub const VAULT_KEY_FILE: &str = "vault.key";

/// Resolve the data directory: `TIANYI_DATA_DIR`, else `~/.tianyi`, else
/// `./.tianyi` when no home directory is known.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var_os(DATA_DIR_ENV), dirs::home_dir())
}

fn data_dir_from(env: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    match env {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home.unwrap_or_else(|| PathBuf::from(".")).join(".tianyi"),
    }
}

/// Load `{data_dir}/config.toml`.
///
/// - Missing file: defaults, logged at debug.
/// - Unreadable or unparsable file: defaults, logged as a warning.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "failed to read config, using defaults");
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "failed to parse config, using defaults");
            ClientConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn data_dir_prefers_env() {
        let dir = data_dir_from(Some("/srv/tianyi".into()), Some("/home/tom".into()));
        assert_eq!(dir, PathBuf::from("/srv/tianyi"));
    }

    #[test]
    fn data_dir_falls_back_to_home() {
        let dir = data_dir_from(None, Some("/home/tom".into()));
        assert_eq!(dir, PathBuf::from("/home/tom/.tianyi"));

        let dir = data_dir_from(Some(OsString::new()), Some("/home/tom".into()));
        assert_eq!(dir, PathBuf::from("/home/tom/.tianyi"));
    }

    #[test]
    fn data_dir_without_home() {
        assert_eq!(data_dir_from(None, None), PathBuf::from("./.tianyi"));
    }

    #[tokio::test]
    async fn load_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_client_config(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
    }

    #[tokio::test]
    async fn load_valid_toml() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
reply_delay_ms = 250
reply_text = "ok"
verify_on_startup = true

[logging]
format = "json"
"#,
        )
        .await
        .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.reply_delay(), Duration::from_millis(250));
        assert_eq!(config.reply_text, "ok");
        assert!(config.verify_on_startup);
        assert_eq!(config.auth_latency(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn load_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
    }
}
