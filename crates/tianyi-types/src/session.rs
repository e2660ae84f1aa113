//! Authentication session types.
//!
//! `SessionState` is the state machine owned by the session manager.
//! `Session` is the flat snapshot the presentation layer renders, and
//! `AuthOutcome` is the `{success, message}` pair shown after a login or
//! registration attempt.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::error::AuthError;

/// Authentication state of the client.
///
/// Starts in `Loading` until the startup auto-login check completes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Loading,
    LoggedOut,
    LoggedIn { username: String },
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    /// Username of the logged-in user, if any.
    pub fn username(&self) -> Option<&str> {
        match self {
            SessionState::LoggedIn { username } => Some(username),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Loading => write!(f, "loading"),
            SessionState::LoggedOut => write!(f, "logged out"),
            SessionState::LoggedIn { username } => write!(f, "logged in as {username}"),
        }
    }
}

/// Presentation snapshot of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_logged_in: bool,
    pub is_loading: bool,
    pub username: String,
}

impl From<&SessionState> for Session {
    fn from(state: &SessionState) -> Self {
        Self {
            is_logged_in: state.is_logged_in(),
            is_loading: state.is_loading(),
            username: state.username().unwrap_or_default().to_string(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::from(&SessionState::default())
    }
}

/// Result of a login or registration intent, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

impl From<Result<String, AuthError>> for AuthOutcome {
    fn from(result: Result<String, AuthError>) -> Self {
        match result {
            Ok(message) => Self {
                success: true,
                message,
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
            },
        }
    }
}
