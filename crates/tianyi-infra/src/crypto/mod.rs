//! Cryptographic operations for saved credentials.
//!
//! - `vault`: AES-256-GCM encryption with a locally held master key
//! - `cipher`: adapts the vault to the `CredentialCipher` port

pub mod cipher;
pub mod vault;
