//! Session manager for the authentication lifecycle.
//!
//! Owns the `SessionState` machine (`Loading -> LoggedOut | LoggedIn`), the
//! four persisted credential entries, and the one-time auto-login check run
//! at startup. All state changes go through this type; the presentation
//! layer observes them through `subscribe()`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::ExposeSecret;
use tianyi_types::credential::{
    AUTH_TOKEN_KEY, AUTO_LOGIN_ENABLED, AUTO_LOGIN_KEY, AUTO_LOGIN_KEYS, SAVED_PASSWORD_KEY,
    SAVED_USERNAME_KEY,
};
use tianyi_types::error::{AuthError, StorageError, ValidationError};
use tianyi_types::session::{Session, SessionState};
use tokio::sync::{OnceCell, watch};
use tracing::{debug, info, warn};

use super::authenticator::{AuthGrant, LoginRequest, RegisterRequest};
use super::box_authenticator::BoxAuthenticator;
use super::cipher::CredentialCipher;
use crate::storage::kv_store::KvStore;

const LOGIN_SUCCEEDED: &str = "login successful";
const REGISTER_SUCCEEDED: &str = "registration successful, please log in";

/// Credentials remembered for auto-login, already opened by the cipher.
struct SavedCredentials {
    username: String,
    password: String,
}

/// Owns authentication state and credential persistence.
///
/// Generic over `KvStore` so the core never depends on a concrete storage
/// backend. Construct once at startup and share by reference or `Arc`.
pub struct SessionManager<S: KvStore> {
    store: S,
    authenticator: BoxAuthenticator,
    cipher: Arc<dyn CredentialCipher>,
    verify_on_startup: bool,
    state: watch::Sender<SessionState>,
    initialized: OnceCell<()>,
    auth_in_flight: AtomicBool,
}

impl<S: KvStore> SessionManager<S> {
    /// Create a session manager in the `Loading` state.
    pub fn new(
        store: S,
        authenticator: BoxAuthenticator,
        cipher: Arc<dyn CredentialCipher>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            store,
            authenticator,
            cipher,
            verify_on_startup: false,
            state,
            initialized: OnceCell::new(),
            auth_in_flight: AtomicBool::new(false),
        }
    }

    /// Re-authenticate remembered credentials at startup instead of trusting
    /// the stored auto-login flag.
    pub fn with_verify_on_startup(mut self, verify: bool) -> Self {
        self.verify_on_startup = verify;
        self
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state machine value.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Flat snapshot for rendering.
    pub fn snapshot(&self) -> Session {
        Session::from(&*self.state.borrow())
    }

    /// Receive every future state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Whether a login or registration is outstanding.
    pub fn is_auth_in_flight(&self) -> bool {
        self.auth_in_flight.load(Ordering::Acquire)
    }

    // --- Lifecycle ---

    /// Run the startup auto-login check.
    ///
    /// Executes at most once per manager; later calls wait for the first run
    /// and return the resulting state. Storage failures are logged and end in
    /// `LoggedOut`.
    pub async fn initialize(&self) -> SessionState {
        self.initialized.get_or_init(|| self.bootstrap()).await;
        self.state()
    }

    async fn bootstrap(&self) {
        let next = match self.restore().await {
            Ok(Some(username)) => {
                info!(%username, "auto-login restored session");
                SessionState::LoggedIn { username }
            }
            Ok(None) => SessionState::LoggedOut,
            Err(e) => {
                warn!(error = %e, "auto-login check failed, starting logged out");
                SessionState::LoggedOut
            }
        };
        self.state.send_replace(next);
    }

    /// Resolve the remembered user, if auto-login applies.
    async fn restore(&self) -> Result<Option<String>, StorageError> {
        let Some(saved) = self.load_saved_credentials().await? else {
            debug!("no auto-login credentials stored");
            return Ok(None);
        };

        if self.verify_on_startup {
            let request = LoginRequest::new(saved.username.as_str(), saved.password);
            return match self.authenticator.login(&request).await {
                Ok(grant) => {
                    self.store.set(AUTH_TOKEN_KEY, &grant.token).await?;
                    Ok(Some(saved.username))
                }
                Err(e) => {
                    warn!(username = %saved.username, error = %e, "saved credentials failed verification");
                    Ok(None)
                }
            };
        }

        // Trust the flag. Only fetch a token when logout removed the old one.
        let has_token = self
            .store
            .get(AUTH_TOKEN_KEY)
            .await?
            .is_some_and(|token| !token.is_empty());
        if !has_token {
            match self.authenticator.resume(&saved.username).await {
                Ok(grant) => self.store.set(AUTH_TOKEN_KEY, &grant.token).await?,
                Err(e) => {
                    warn!(username = %saved.username, error = %e, "could not resume remembered session");
                    return Ok(None);
                }
            }
        }

        Ok(Some(saved.username))
    }

    async fn load_saved_credentials(&self) -> Result<Option<SavedCredentials>, StorageError> {
        let flag = self.store.get(AUTO_LOGIN_KEY).await?;
        if flag.as_deref() != Some(AUTO_LOGIN_ENABLED) {
            return Ok(None);
        }

        let username = self.store.get(SAVED_USERNAME_KEY).await?;
        let sealed = self.store.get(SAVED_PASSWORD_KEY).await?;
        match (username, sealed) {
            (Some(username), Some(sealed)) if !username.is_empty() && !sealed.is_empty() => {
                let password = self.cipher.open(&sealed)?;
                if password.is_empty() {
                    return Ok(None);
                }
                Ok(Some(SavedCredentials { username, password }))
            }
            _ => Ok(None),
        }
    }

    // --- Intents ---

    /// Log in, remembering the credentials when `auto_login` is set.
    ///
    /// Returns the confirmation message. Empty input fails validation before
    /// the store is touched.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        auto_login: bool,
    ) -> Result<String, AuthError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(ValidationError::EmptyCredentials.into());
        }

        self.initialize().await;
        let _guard = self.begin_auth()?;

        let request = LoginRequest::new(username, password);
        let grant = self.authenticator.login(&request).await.inspect_err(|e| {
            info!(%username, error = %e, "login rejected");
        })?;

        self.persist_login(&request, auto_login, &grant)
            .await
            .map_err(|e| {
                warn!(%username, error = %e, "failed to persist login");
                AuthError::Persistence(e)
            })?;

        self.state.send_replace(SessionState::LoggedIn {
            username: username.to_string(),
        });
        info!(%username, auto_login, "login succeeded");

        Ok(LOGIN_SUCCEEDED.to_string())
    }

    async fn persist_login(
        &self,
        request: &LoginRequest,
        auto_login: bool,
        grant: &AuthGrant,
    ) -> Result<(), StorageError> {
        if auto_login {
            let sealed = self.cipher.seal(request.password.expose_secret())?;
            self.store.set(AUTO_LOGIN_KEY, AUTO_LOGIN_ENABLED).await?;
            self.store.set(SAVED_USERNAME_KEY, &request.username).await?;
            self.store.set(SAVED_PASSWORD_KEY, &sealed).await?;
        } else {
            self.clear_saved_credentials().await?;
        }

        self.store.set(AUTH_TOKEN_KEY, &grant.token).await
    }

    async fn clear_saved_credentials(&self) -> Result<(), StorageError> {
        for key in AUTO_LOGIN_KEYS {
            self.store.remove(key).await?;
        }
        Ok(())
    }

    /// Create an account. Session state is left unchanged; the caller routes
    /// the user to login.
    ///
    /// Fields are validated in order username, password, invite code.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        invite_code: &str,
    ) -> Result<String, AuthError> {
        if username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        if password.trim().is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        if invite_code.trim().is_empty() {
            return Err(ValidationError::EmptyInviteCode.into());
        }

        self.initialize().await;
        let _guard = self.begin_auth()?;

        let request = RegisterRequest::new(username, password, invite_code);
        self.authenticator.register(&request).await.inspect_err(|e| {
            info!(%username, error = %e, "registration rejected");
        })?;
        info!(%username, "registration succeeded");

        Ok(REGISTER_SUCCEEDED.to_string())
    }

    /// Log out.
    ///
    /// Removes only the auth token; the auto-login entries survive so the
    /// next start can still log in automatically.
    pub async fn logout(&self) {
        self.initialize().await;

        if let Err(e) = self.store.remove(AUTH_TOKEN_KEY).await {
            warn!(error = %e, "failed to remove auth token on logout");
        }
        let previous = self.state.send_replace(SessionState::LoggedOut);
        if let Some(username) = previous.username() {
            info!(%username, "logged out");
        }
    }

    fn begin_auth(&self) -> Result<AuthGuard<'_>, AuthError> {
        if self.auth_in_flight.swap(true, Ordering::AcqRel) {
            return Err(AuthError::Busy);
        }
        Ok(AuthGuard(&self.auth_in_flight))
    }
}

/// Clears the in-flight flag when an auth request finishes or is dropped.
struct AuthGuard<'a>(&'a AtomicBool);

impl Drop for AuthGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authenticator::Authenticator;
    use crate::auth::cipher::PlaintextCipher;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    // --- Mock store ---

    #[derive(Default)]
    struct MockStore {
        entries: Mutex<HashMap<String, String>>,
        writes: AtomicUsize,
        reads: AtomicUsize,
        fail_reads: bool,
        fail_writes_to: Option<&'static str>,
    }

    impl MockStore {
        fn with_entries(entries: &[(&str, &str)]) -> Self {
            let store = Self::default();
            {
                let mut map = store.entries.lock().unwrap();
                for (k, v) in entries {
                    map.insert(k.to_string(), v.to_string());
                }
            }
            store
        }

        fn value(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn touches(&self) -> usize {
            self.reads.load(Ordering::SeqCst) + self.writes.load(Ordering::SeqCst)
        }
    }

    impl KvStore for MockStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                return Err(StorageError::Connection);
            }
            Ok(self.value(key))
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes_to == Some(key) {
                return Err(StorageError::Query("disk full".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    // --- Mock authenticator ---

    #[derive(Default, Clone)]
    struct MockAuthenticator {
        latency: Duration,
        reject_password: Option<&'static str>,
        logins: Arc<AtomicUsize>,
        resumes: Arc<AtomicUsize>,
        registrations: Arc<AtomicUsize>,
    }

    impl Authenticator for MockAuthenticator {
        fn name(&self) -> &str {
            "mock"
        }

        async fn login(&self, request: &LoginRequest) -> Result<AuthGrant, AuthError> {
            tokio::time::sleep(self.latency).await;
            let n = self.logins.fetch_add(1, Ordering::SeqCst);
            if self.reject_password == Some(request.password.expose_secret()) {
                return Err(AuthError::Rejected("wrong password".to_string()));
            }
            Ok(AuthGrant {
                token: format!("token-{n}"),
            })
        }

        async fn resume(&self, _username: &str) -> Result<AuthGrant, AuthError> {
            let n = self.resumes.fetch_add(1, Ordering::SeqCst);
            Ok(AuthGrant {
                token: format!("resumed-{n}"),
            })
        }

        async fn register(&self, _request: &RegisterRequest) -> Result<(), AuthError> {
            tokio::time::sleep(self.latency).await;
            self.registrations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Reverses the secret so tests can tell sealed from plain.
    struct ReverseCipher;

    impl CredentialCipher for ReverseCipher {
        fn seal(&self, plaintext: &str) -> Result<String, StorageError> {
            Ok(plaintext.chars().rev().collect())
        }

        fn open(&self, sealed: &str) -> Result<String, StorageError> {
            Ok(sealed.chars().rev().collect())
        }
    }

    fn manager(store: MockStore) -> SessionManager<MockStore> {
        manager_with(store, MockAuthenticator::default())
    }

    fn manager_with(store: MockStore, auth: MockAuthenticator) -> SessionManager<MockStore> {
        SessionManager::new(store, BoxAuthenticator::new(auth), Arc::new(PlaintextCipher))
    }

    fn remembered(username: &str, password: &str) -> MockStore {
        MockStore::with_entries(&[
            (AUTO_LOGIN_KEY, "true"),
            (SAVED_USERNAME_KEY, username),
            (SAVED_PASSWORD_KEY, password),
        ])
    }

    // --- initialize ---

    #[tokio::test]
    async fn test_starts_loading() {
        let mgr = manager(MockStore::default());
        let session = mgr.snapshot();
        assert!(session.is_loading);
        assert!(!session.is_logged_in);
    }

    #[tokio::test]
    async fn test_initialize_empty_store_logs_out() {
        let mgr = manager(MockStore::default());
        let state = mgr.initialize().await;

        assert_eq!(state, SessionState::LoggedOut);
        let session = mgr.snapshot();
        assert!(!session.is_logged_in);
        assert!(!session.is_loading);
    }

    #[tokio::test]
    async fn test_initialize_auto_login() {
        let store = remembered("tom", "pw123");
        store
            .entries
            .lock()
            .unwrap()
            .insert(AUTH_TOKEN_KEY.to_string(), "existing".to_string());
        let auth = MockAuthenticator::default();
        let mgr = manager_with(store, auth.clone());

        let state = mgr.initialize().await;
        assert_eq!(
            state,
            SessionState::LoggedIn {
                username: "tom".to_string()
            }
        );
        // Trusted without contacting the authority
        assert_eq!(auth.logins.load(Ordering::SeqCst), 0);
        assert_eq!(auth.resumes.load(Ordering::SeqCst), 0);
        assert_eq!(mgr.store().value(AUTH_TOKEN_KEY).as_deref(), Some("existing"));
    }

    #[tokio::test]
    async fn test_initialize_auto_login_after_logout_resumes_token() {
        let auth = MockAuthenticator::default();
        let mgr = manager_with(remembered("tom", "pw123"), auth.clone());

        assert!(mgr.initialize().await.is_logged_in());
        assert_eq!(auth.resumes.load(Ordering::SeqCst), 1);
        assert_eq!(mgr.store().value(AUTH_TOKEN_KEY).as_deref(), Some("resumed-0"));
    }

    #[tokio::test]
    async fn test_initialize_flag_without_password_logs_out() {
        let store = MockStore::with_entries(&[
            (AUTO_LOGIN_KEY, "true"),
            (SAVED_USERNAME_KEY, "tom"),
        ]);
        let mgr = manager(store);
        assert_eq!(mgr.initialize().await, SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn test_initialize_flag_not_true_logs_out() {
        let store = MockStore::with_entries(&[
            (AUTO_LOGIN_KEY, "false"),
            (SAVED_USERNAME_KEY, "tom"),
            (SAVED_PASSWORD_KEY, "pw123"),
        ]);
        let mgr = manager(store);
        assert_eq!(mgr.initialize().await, SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn test_initialize_read_failure_logs_out() {
        let store = MockStore {
            fail_reads: true,
            ..remembered("tom", "pw123")
        };
        let mgr = manager(store);
        assert_eq!(mgr.initialize().await, SessionState::LoggedOut);
        assert!(!mgr.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let mgr = manager(remembered("tom", "pw123"));
        mgr.initialize().await;
        let reads = mgr.store().reads.load(Ordering::SeqCst);

        mgr.initialize().await;
        mgr.initialize().await;
        assert_eq!(mgr.store().reads.load(Ordering::SeqCst), reads);
    }

    #[tokio::test]
    async fn test_initialize_verify_on_startup_rejects() {
        let auth = MockAuthenticator {
            reject_password: Some("stale"),
            ..Default::default()
        };
        let mgr = manager_with(remembered("tom", "stale"), auth.clone()).with_verify_on_startup(true);

        assert_eq!(mgr.initialize().await, SessionState::LoggedOut);
        assert_eq!(auth.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_initialize_verify_on_startup_accepts() {
        let auth = MockAuthenticator::default();
        let mgr = manager_with(remembered("tom", "pw123"), auth.clone()).with_verify_on_startup(true);

        assert!(mgr.initialize().await.is_logged_in());
        assert_eq!(auth.logins.load(Ordering::SeqCst), 1);
        assert_eq!(mgr.store().value(AUTH_TOKEN_KEY).as_deref(), Some("token-0"));
    }

    // --- login ---

    #[tokio::test]
    async fn test_login_empty_fields_touch_nothing() {
        let mgr = manager(MockStore::default());

        for (user, pass) in [("", "pw"), ("tom", ""), ("   ", "pw"), ("tom", " \t")] {
            let err = mgr.login(user, pass, true).await.unwrap_err();
            assert_eq!(err, AuthError::Validation(ValidationError::EmptyCredentials));
            assert_eq!(err.to_string(), "username or password empty");
        }

        assert_eq!(mgr.store().touches(), 0);
        assert!(mgr.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_login_with_auto_login_persists_credentials() {
        let mgr = manager(MockStore::default());
        mgr.initialize().await;

        let message = mgr.login("tom", "pw123", true).await.unwrap();
        assert_eq!(message, "login successful");

        let store = mgr.store();
        assert_eq!(store.value(AUTO_LOGIN_KEY).as_deref(), Some("true"));
        assert_eq!(store.value(SAVED_USERNAME_KEY).as_deref(), Some("tom"));
        assert_eq!(store.value(SAVED_PASSWORD_KEY).as_deref(), Some("pw123"));
        assert!(store.value(AUTH_TOKEN_KEY).is_some_and(|t| !t.is_empty()));

        let session = mgr.snapshot();
        assert!(session.is_logged_in);
        assert_eq!(session.username, "tom");
    }

    #[tokio::test]
    async fn test_login_without_auto_login_clears_credentials() {
        let mgr = manager(remembered("old", "oldpw"));
        mgr.initialize().await;

        mgr.login("tom", "pw123", false).await.unwrap();

        let store = mgr.store();
        for key in AUTO_LOGIN_KEYS {
            assert!(store.value(key).is_none(), "{key} should be cleared");
        }
        assert!(store.value(AUTH_TOKEN_KEY).is_some());
        assert_eq!(mgr.state().username(), Some("tom"));
    }

    #[tokio::test]
    async fn test_login_without_auto_login_on_empty_store_is_idempotent() {
        let mgr = manager(MockStore::default());
        mgr.login("tom", "pw123", false).await.unwrap();
        mgr.login("tom", "pw123", false).await.unwrap();
        assert!(mgr.store().value(AUTO_LOGIN_KEY).is_none());
    }

    #[tokio::test]
    async fn test_login_waits_for_initialize() {
        let mgr = manager(remembered("old", "oldpw"));
        // No explicit initialize: login runs it first, then overrides.
        mgr.login("tom", "pw123", false).await.unwrap();
        assert_eq!(mgr.state().username(), Some("tom"));
    }

    #[tokio::test]
    async fn test_login_seals_saved_password() {
        let mgr = SessionManager::new(
            MockStore::default(),
            BoxAuthenticator::new(MockAuthenticator::default()),
            Arc::new(ReverseCipher),
        );
        mgr.login("tom", "pw123", true).await.unwrap();
        assert_eq!(mgr.store().value(SAVED_PASSWORD_KEY).as_deref(), Some("321wp"));
    }

    #[tokio::test]
    async fn test_sealed_password_restores_on_next_start() {
        let store = Arc::new(MockStore::default());
        let first = SessionManager::new(
            store.clone(),
            BoxAuthenticator::new(MockAuthenticator::default()),
            Arc::new(ReverseCipher),
        );
        first.login("tom", "pw123", true).await.unwrap();

        let second = SessionManager::new(
            store,
            BoxAuthenticator::new(MockAuthenticator::default()),
            Arc::new(ReverseCipher),
        )
        .with_verify_on_startup(true);
        assert_eq!(second.initialize().await.username(), Some("tom"));
    }

    #[tokio::test]
    async fn test_login_rejected_keeps_state() {
        let auth = MockAuthenticator {
            reject_password: Some("bad"),
            ..Default::default()
        };
        let mgr = manager_with(MockStore::default(), auth);
        mgr.initialize().await;

        let err = mgr.login("tom", "bad", true).await.unwrap_err();
        assert_eq!(err, AuthError::Rejected("wrong password".to_string()));
        assert_eq!(mgr.state(), SessionState::LoggedOut);
        assert!(mgr.store().value(AUTH_TOKEN_KEY).is_none());
        assert!(!mgr.is_auth_in_flight());
    }

    #[tokio::test]
    async fn test_login_token_write_failure_is_retryable() {
        let store = MockStore {
            fail_writes_to: Some(AUTH_TOKEN_KEY),
            ..Default::default()
        };
        let mgr = manager(store);
        mgr.initialize().await;

        let err = mgr.login("tom", "pw123", false).await.unwrap_err();
        assert!(matches!(err, AuthError::Persistence(_)));
        assert!(err.is_retryable());
        assert_eq!(mgr.state(), SessionState::LoggedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_login_is_rejected() {
        let auth = MockAuthenticator {
            latency: Duration::from_millis(500),
            ..Default::default()
        };
        let mgr = manager_with(MockStore::default(), auth.clone());
        mgr.initialize().await;

        let (first, second) = tokio::join!(
            mgr.login("tom", "pw123", false),
            mgr.login("tom", "pw123", false)
        );
        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), AuthError::Busy);
        assert_eq!(auth.logins.load(Ordering::SeqCst), 1);
        assert!(!mgr.is_auth_in_flight());
    }

    // --- register ---

    #[tokio::test]
    async fn test_register_validation_order() {
        let mgr = manager(MockStore::default());

        let cases = [
            (("", "", ""), ValidationError::EmptyUsername),
            (("", "pw", "code"), ValidationError::EmptyUsername),
            (("tom", "", ""), ValidationError::EmptyPassword),
            (("tom", " ", "code"), ValidationError::EmptyPassword),
            (("tom", "pw", ""), ValidationError::EmptyInviteCode),
        ];
        for ((user, pass, code), expected) in cases {
            let err = mgr.register(user, pass, code).await.unwrap_err();
            assert_eq!(err, AuthError::Validation(expected));
        }
        assert_eq!(mgr.store().touches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_success_leaves_session_unchanged() {
        let auth = MockAuthenticator {
            latency: Duration::from_millis(500),
            ..Default::default()
        };
        let mgr = manager_with(MockStore::default(), auth.clone());
        mgr.initialize().await;

        let message = mgr.register("tom", "pw123", "INVITE").await.unwrap();
        assert_eq!(message, "registration successful, please log in");
        assert_eq!(auth.registrations.load(Ordering::SeqCst), 1);
        assert_eq!(mgr.state(), SessionState::LoggedOut);
        assert!(mgr.store().value(AUTH_TOKEN_KEY).is_none());
    }

    // --- logout ---

    #[tokio::test]
    async fn test_logout_keeps_auto_login_entries() {
        let mgr = manager(MockStore::default());
        mgr.login("tom", "pw123", true).await.unwrap();

        mgr.logout().await;

        let store = mgr.store();
        assert!(store.value(AUTH_TOKEN_KEY).is_none());
        assert_eq!(store.value(AUTO_LOGIN_KEY).as_deref(), Some("true"));
        assert_eq!(store.value(SAVED_USERNAME_KEY).as_deref(), Some("tom"));
        assert_eq!(store.value(SAVED_PASSWORD_KEY).as_deref(), Some("pw123"));
        assert_eq!(mgr.state(), SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn test_logout_without_auto_login() {
        let mgr = manager(MockStore::default());
        mgr.login("tom", "pw123", false).await.unwrap();
        mgr.logout().await;

        assert!(mgr.store().value(AUTH_TOKEN_KEY).is_none());
        let session = mgr.snapshot();
        assert!(!session.is_logged_in);
        assert!(session.username.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_sees_transitions() {
        let mgr = manager(MockStore::default());
        let mut rx = mgr.subscribe();

        mgr.initialize().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionState::LoggedOut);

        mgr.login("tom", "pw123", false).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_logged_in());
    }
}
