//! Identity provider seam used by the dashboard's authentication gate.

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

use super::ClientError;
use crate::models::principal::Principal;
use crate::services::auth::{self, AuthError};

/// External identity provider: interactive sign-in, sign-out and an
/// auth-state channel that reports the current principal on every change.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self) -> Result<Principal, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    fn current(&self) -> Option<Principal>;

    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;
}

/// Provider backed by a signed ID token. Sign-in verifies the token and
/// publishes its subject as the principal.
pub struct TokenIdentityProvider {
    secret: String,
    token: Mutex<Option<String>>,
    state: watch::Sender<Option<Principal>>,
}

impl TokenIdentityProvider {
    pub fn new(secret: impl Into<String>, token: Option<String>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            secret: secret.into(),
            token: Mutex::new(token),
            state,
        }
    }

    /// Replace the token presented on the next sign-in.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.lock().await = token;
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentityProvider {
    async fn sign_in(&self) -> Result<Principal, ClientError> {
        let token = self.token.lock().await.clone().ok_or(AuthError::MissingToken)?;
        let claims = auth::validate_id_token(&token, &self.secret)?;
        let principal = Principal::from(claims);

        tracing::info!(uid = %principal.uid, "Signed in");
        self.state.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        if let Some(previous) = self.state.send_replace(None) {
            tracing::info!(uid = %previous.uid, "Signed out");
        }
        Ok(())
    }

    fn current(&self) -> Option<Principal> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.state.subscribe()
    }
}
