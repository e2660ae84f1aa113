//! AES-256-GCM vault encryption for credentials at rest.
//!
//! The 32-byte master key comes from one of:
//! - a raw key (tests)
//! - a key file in the data directory, generated on first use
//! - the OS keychain, generated on first use
//!
//! Encrypted format: `nonce (12 bytes) || ciphertext`.
//! Keys are persisted base64-encoded.
//!
//! SECURITY: error types never contain plaintext or key material.

use std::io::Write;
use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Nonce size for AES-256-GCM (96 bits).
const NONCE_SIZE: usize = 12;

const KEY_SIZE: usize = 32;

/// Keychain service and account holding the master key.
const KEYCHAIN_SERVICE: &str = "tianyi";
const KEYCHAIN_USER: &str = "credential-vault-key";

/// Errors from vault operations.
///
/// Display/Debug output never includes plaintext, key material, or ciphertext.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("invalid master key")]
    InvalidKey,

    #[error("key file error: {0}")]
    KeyFile(#[from] std::io::Error),

    #[error("keychain unavailable: {0}")]
    KeychainUnavailable(String),

    #[error("keychain error: {0}")]
    KeychainError(String),
}

/// Symmetric encryption with a fresh random nonce per call, so sealing the
/// same plaintext twice yields different output.
pub struct VaultCrypto {
    cipher: Aes256Gcm,
}

impl VaultCrypto {
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Load the master key from `path`, generating and writing one if the
    /// file does not exist. On Unix the new file is created with mode 0600.
    pub fn from_key_file(path: &Path) -> Result<Self, VaultError> {
        match std::fs::read_to_string(path) {
            Ok(encoded) => {
                let key = decode_key(&encoded)?;
                Ok(Self::new(&key))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let key = random_key();
                write_key_file(path, &STANDARD.encode(key))?;
                tracing::info!(path = %path.display(), "generated credential vault key");
                Ok(Self::new(&key))
            }
            Err(e) => Err(VaultError::KeyFile(e)),
        }
    }

    /// Load or generate the master key in the OS keychain.
    pub fn from_keychain() -> Result<Self, VaultError> {
        let entry = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER)
            .map_err(|e| VaultError::KeychainUnavailable(e.to_string()))?;

        match entry.get_password() {
            Ok(encoded) => {
                let key = decode_key(&encoded)?;
                Ok(Self::new(&key))
            }
            Err(keyring::Error::NoEntry) => {
                let key = random_key();
                entry
                    .set_password(&STANDARD.encode(key))
                    .map_err(|e| VaultError::KeychainError(e.to_string()))?;
                tracing::info!("generated credential vault key in OS keychain");
                Ok(Self::new(&key))
            }
            Err(e) => Err(VaultError::KeychainUnavailable(e.to_string())),
        }
    }

    /// Encrypt with a random nonce. Returns `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| VaultError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt data produced by `encrypt()`.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        if data.len() < NONCE_SIZE {
            return Err(VaultError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }
}

fn random_key() -> [u8; KEY_SIZE] {
    use aes_gcm::aead::rand_core::RngCore;
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    key
}

fn decode_key(encoded: &str) -> Result<[u8; KEY_SIZE], VaultError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| VaultError::InvalidKey)?;
    bytes.try_into().map_err(|_| VaultError::InvalidKey)
}

fn write_key_file(path: &Path, contents: &str) -> Result<(), VaultError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_encrypt_decrypt() {
        let crypto = VaultCrypto::new(&test_key());
        let encrypted = crypto.encrypt(b"pw123").unwrap();
        assert_ne!(&encrypted[NONCE_SIZE..], b"pw123");
        assert_eq!(crypto.decrypt(&encrypted).unwrap(), b"pw123");
    }

    #[test]
    fn test_wrong_key_fails() {
        let crypto = VaultCrypto::new(&test_key());
        let mut other_key = test_key();
        other_key[0] = 0xFF;
        let other = VaultCrypto::new(&other_key);

        let encrypted = crypto.encrypt(b"pw123").unwrap();
        assert!(matches!(
            other.decrypt(&encrypted),
            Err(VaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_nonce_is_random() {
        let crypto = VaultCrypto::new(&test_key());
        let first = crypto.encrypt(b"same").unwrap();
        let second = crypto.encrypt(b"same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_ciphertext_too_short() {
        let crypto = VaultCrypto::new(&test_key());
        assert!(matches!(
            crypto.decrypt(&[0u8; 5]),
            Err(VaultError::CiphertextTooShort)
        ));
    }

    #[test]
    fn test_key_file_generated_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("vault.key");

        let first = VaultCrypto::from_key_file(&path).unwrap();
        assert!(path.exists());
        let encrypted = first.encrypt(b"pw123").unwrap();

        let second = VaultCrypto::from_key_file(&path).unwrap();
        assert_eq!(second.decrypt(&encrypted).unwrap(), b"pw123");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_corrupt_key_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.key");
        std::fs::write(&path, "not base64 at all!").unwrap();
        assert!(matches!(
            VaultCrypto::from_key_file(&path),
            Err(VaultError::InvalidKey)
        ));

        std::fs::write(&path, STANDARD.encode([1u8; 16])).unwrap();
        assert!(matches!(
            VaultCrypto::from_key_file(&path),
            Err(VaultError::InvalidKey)
        ));
    }
}
