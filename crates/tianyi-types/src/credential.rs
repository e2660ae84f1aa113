//! Persisted credential keys.
//!
//! The session manager stores four independent string entries. Their key
//! names are part of the on-disk format and must not change.

/// Opaque session token written on every successful login.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// `"true"` when the user asked to be logged in automatically; absent otherwise.
pub const AUTO_LOGIN_KEY: &str = "auto_login";

/// Username remembered for auto-login.
pub const SAVED_USERNAME_KEY: &str = "saved_username";

/// Re-authentication secret remembered for auto-login (sealed by the credential cipher).
pub const SAVED_PASSWORD_KEY: &str = "saved_password";

/// Stored value of the auto-login flag.
pub const AUTO_LOGIN_ENABLED: &str = "true";

/// The three entries that only exist while auto-login is enabled.
pub const AUTO_LOGIN_KEYS: [&str; 3] = [AUTO_LOGIN_KEY, SAVED_USERNAME_KEY, SAVED_PASSWORD_KEY];
