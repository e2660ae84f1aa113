//! `CredentialCipher` backed by the AES-256-GCM vault.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tianyi_core::auth::cipher::CredentialCipher;
use tianyi_types::error::StorageError;

use super::vault::VaultCrypto;

/// Seals the saved password as base64(`nonce || ciphertext`).
#[derive(Clone)]
pub struct VaultCredentialCipher {
    vault: Arc<VaultCrypto>,
}

impl VaultCredentialCipher {
    pub fn new(vault: Arc<VaultCrypto>) -> Self {
        Self { vault }
    }
}

impl CredentialCipher for VaultCredentialCipher {
    fn seal(&self, plaintext: &str) -> Result<String, StorageError> {
        let sealed = self.vault.encrypt(plaintext.as_bytes()).map_err(|e| {
            tracing::warn!(error = %e, "failed to seal credential");
            StorageError::Cipher
        })?;
        Ok(STANDARD.encode(sealed))
    }

    fn open(&self, sealed: &str) -> Result<String, StorageError> {
        let bytes = STANDARD.decode(sealed).map_err(|_| {
            tracing::warn!("stored credential is not valid base64");
            StorageError::Cipher
        })?;
        let plaintext = self.vault.decrypt(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "failed to open credential");
            StorageError::Cipher
        })?;
        String::from_utf8(plaintext).map_err(|_| StorageError::Cipher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> VaultCredentialCipher {
        VaultCredentialCipher::new(Arc::new(VaultCrypto::new(&[7u8; 32])))
    }

    #[test]
    fn test_seal_hides_plaintext() {
        let cipher = cipher();
        let sealed = cipher.seal("pw123").unwrap();
        assert!(!sealed.contains("pw123"));
        assert_eq!(cipher.open(&sealed).unwrap(), "pw123");
    }

    #[test]
    fn test_open_plaintext_value_fails() {
        // A password saved before sealing was enabled cannot be opened.
        assert_eq!(cipher().open("pw123"), Err(StorageError::Cipher));
    }

    #[test]
    fn test_open_with_other_key_fails() {
        let sealed = cipher().seal("pw123").unwrap();
        let other = VaultCredentialCipher::new(Arc::new(VaultCrypto::new(&[9u8; 32])));
        assert_eq!(other.open(&sealed), Err(StorageError::Cipher));
    }
}
