//! Credential cipher trait.
//!
//! The saved re-authentication secret passes through a `CredentialCipher`
//! on its way into and out of the key-value store. The vault-backed
//! implementation lives in tianyi-infra.

use tianyi_types::error::StorageError;

/// Seals and opens the remembered password.
///
/// Implementations must never include the plaintext in errors or logs.
pub trait CredentialCipher: Send + Sync {
    /// Turn a plaintext secret into its stored form.
    fn seal(&self, plaintext: &str) -> Result<String, StorageError>;

    /// Recover the plaintext from its stored form.
    fn open(&self, sealed: &str) -> Result<String, StorageError>;
}

/// Stores the secret unchanged.
///
/// Matches the on-disk format of clients that predate sealed credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCipher;

impl CredentialCipher for PlaintextCipher {
    fn seal(&self, plaintext: &str) -> Result<String, StorageError> {
        Ok(plaintext.to_string())
    }

    fn open(&self, sealed: &str) -> Result<String, StorageError> {
        Ok(sealed.to_string())
    }
}
