//! Authenticator trait definition.
//!
//! The session manager never talks to an authority directly. It hands
//! requests to an `Authenticator` and only depends on the asynchronous
//! `(request) -> result` contract, so a local simulator and a networked
//! client are interchangeable.

use std::fmt;
use std::future::Future;

use secrecy::SecretString;
use tianyi_types::error::AuthError;

/// Credentials for a login attempt.
#[derive(Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// A registration attempt gated by an invite code.
#[derive(Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub password: SecretString,
    pub invite_code: String,
}

impl RegisterRequest {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        invite_code: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            invite_code: invite_code.into(),
        }
    }
}

/// What a successful login or resume yields.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthGrant {
    /// Opaque, revocable session token.
    pub token: String,
}

impl fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGrant").field("token", &"<redacted>").finish()
    }
}

/// Trait for authentication backends (local simulator, networked client).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in tianyi-infra.
pub trait Authenticator: Send + Sync {
    /// Human-readable backend name (e.g., "simulated").
    fn name(&self) -> &str;

    /// Exchange username and password for a session token.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthGrant, AuthError>> + Send;

    /// Exchange a remembered identity for a fresh session token without
    /// re-checking the password.
    fn resume(&self, username: &str) -> impl Future<Output = Result<AuthGrant, AuthError>> + Send;

    /// Create an account.
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;
}
