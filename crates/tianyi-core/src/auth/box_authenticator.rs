//! BoxAuthenticator -- object-safe dynamic dispatch wrapper for Authenticator.
//!
//! 1. Define an object-safe `AuthenticatorDyn` trait with boxed futures
//! 2. Blanket-impl `AuthenticatorDyn` for all `T: Authenticator`
//! 3. `BoxAuthenticator` wraps `Box<dyn AuthenticatorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use tianyi_types::error::AuthError;

use super::authenticator::{AuthGrant, Authenticator, LoginRequest, RegisterRequest};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`Authenticator`] with boxed futures.
pub trait AuthenticatorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn login_boxed<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> BoxFuture<'a, Result<AuthGrant, AuthError>>;

    fn resume_boxed<'a>(&'a self, username: &'a str) -> BoxFuture<'a, Result<AuthGrant, AuthError>>;

    fn register_boxed<'a>(
        &'a self,
        request: &'a RegisterRequest,
    ) -> BoxFuture<'a, Result<(), AuthError>>;
}

impl<T: Authenticator> AuthenticatorDyn for T {
    fn name(&self) -> &str {
        Authenticator::name(self)
    }

    fn login_boxed<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> BoxFuture<'a, Result<AuthGrant, AuthError>> {
        Box::pin(self.login(request))
    }

    fn resume_boxed<'a>(&'a self, username: &'a str) -> BoxFuture<'a, Result<AuthGrant, AuthError>> {
        Box::pin(self.resume(username))
    }

    fn register_boxed<'a>(
        &'a self,
        request: &'a RegisterRequest,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        Box::pin(self.register(request))
    }
}

/// Type-erased authenticator for runtime backend selection.
///
/// Since `Authenticator` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxAuthenticator` provides equivalent methods that delegate to
/// the inner `AuthenticatorDyn` trait object.
pub struct BoxAuthenticator {
    inner: Box<dyn AuthenticatorDyn + Send + Sync>,
}

impl BoxAuthenticator {
    /// Wrap a concrete `Authenticator` in a type-erased box.
    pub fn new<T: Authenticator + 'static>(authenticator: T) -> Self {
        Self {
            inner: Box::new(authenticator),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthGrant, AuthError> {
        self.inner.login_boxed(request).await
    }

    pub async fn resume(&self, username: &str) -> Result<AuthGrant, AuthError> {
        self.inner.resume_boxed(username).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        self.inner.register_boxed(request).await
    }
}

impl std::fmt::Debug for BoxAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxAuthenticator")
            .field("name", &self.name())
            .finish()
    }
}
