use std::time::Duration;

use thiserror::Error;

/// Errors from the persistent key-value store and the credential cipher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    /// Sealing or opening a stored credential failed. Never carries the value.
    #[error("credential cipher error")]
    Cipher,
}

/// A required field was empty after trimming.
///
/// The display strings are shown to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("username or password empty")]
    EmptyCredentials,

    #[error("username empty")]
    EmptyUsername,

    #[error("password empty")]
    EmptyPassword,

    #[error("invite code empty")]
    EmptyInviteCode,
}

/// Errors from login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The authority refused the request (bad password, used invite code).
    #[error("{0}")]
    Rejected(String),

    /// The authority could not be reached.
    #[error("authentication service unavailable: {0}")]
    Unavailable(String),

    /// Another login or registration is still outstanding.
    #[error("request already in progress")]
    Busy,

    /// Credential persistence failed after the authority accepted the login.
    #[error("login failed, please retry")]
    Persistence(#[source] StorageError),
}

impl AuthError {
    /// Whether resubmitting the same input can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::Unavailable(_) | AuthError::Busy | AuthError::Persistence(_)
        )
    }
}

/// Errors from a response source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("reply failed: {0}")]
    Failure(String),
}

impl ResponseError {
    /// Both variants leave the failed message eligible for `retry`.
    pub fn is_retryable(&self) -> bool {
        true
    }
}
