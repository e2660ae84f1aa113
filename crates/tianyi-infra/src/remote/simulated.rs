//! Simulated authenticator: fixed latency, never rejects.

use std::time::Duration;

use tianyi_core::auth::authenticator::{AuthGrant, Authenticator, LoginRequest, RegisterRequest};
use tianyi_types::error::AuthError;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SimulatedAuthenticator {
    latency: Duration,
}

impl SimulatedAuthenticator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    fn grant() -> AuthGrant {
        AuthGrant {
            token: Uuid::now_v7().simple().to_string(),
        }
    }
}

impl Authenticator for SimulatedAuthenticator {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthGrant, AuthError> {
        tokio::time::sleep(self.latency).await;
        tracing::debug!(username = %request.username, "simulated login accepted");
        Ok(Self::grant())
    }

    async fn resume(&self, username: &str) -> Result<AuthGrant, AuthError> {
        tracing::debug!(username, "simulated session resumed");
        Ok(Self::grant())
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        tokio::time::sleep(self.latency).await;
        tracing::debug!(username = %request.username, "simulated registration accepted");
        Ok(())
    }
}
