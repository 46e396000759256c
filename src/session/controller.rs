use std::sync::Arc;

use tracing::{debug, info};

use crate::client::ApiClient;
use crate::errors::LoginError;
use crate::models::UserIdentity;
use crate::session::Credentials;
use crate::store::TokenStore;

/// Lifecycle of the client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Read-only view handed to callers; the controller keeps ownership of the
/// session itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub current_user: Option<UserIdentity>,
}

/// Owns the client session and drives its state machine:
/// `Anonymous → Authenticating → Authenticated`, back to `Anonymous` on
/// logout or on a failed login.
///
/// All transitions go through `&mut self`, so a second login while one is
/// in flight is impossible by construction.
pub struct SessionController {
    state: SessionState,
    current_user: Option<UserIdentity>,
    raw_token: Option<String>,
    api: ApiClient,
    store: Arc<TokenStore>,
}

impl SessionController {
    pub fn new(api: ApiClient, store: Arc<TokenStore>) -> Self {
        SessionController {
            state: SessionState::Anonymous,
            current_user: None,
            raw_token: None,
            api,
            store,
        }
    }

    /// Submit credentials. On success the token is written through the
    /// store (slot per the remember-me flag), set as the default outbound
    /// credential, and the session becomes Authenticated. On failure the
    /// session returns to Anonymous and the error message is surfaced for
    /// the form.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<UserIdentity, LoginError> {
        self.state = SessionState::Authenticating;

        match self.api.login(credentials).await {
            Ok(success) => {
                self.store
                    .write(&success.token, credentials.remember_me)
                    .await;
                self.api.set_default_bearer(Some(success.token.clone()));
                self.state = SessionState::Authenticated;
                self.current_user = Some(success.user.clone());
                self.raw_token = Some(success.token);
                info!("Session authenticated for '{}'", success.user.email);
                Ok(success.user)
            }
            Err(err) => {
                debug!("Login failed: {}", err.message());
                self.reset_session();
                Err(err)
            }
        }
    }

    /// Tear the session down: storage, default credential and state. Always
    /// succeeds from the caller's perspective.
    pub async fn logout(&mut self) {
        self.store.clear().await;
        self.api.set_default_bearer(None);
        self.reset_session();
        info!("Session logged out");
    }

    /// Pick up a stored token from an earlier run and confirm it against
    /// the trusted boundary. On confirmation the session becomes
    /// Authenticated; otherwise it stays Anonymous and storage is left as
    /// it was.
    pub async fn resume(&mut self) -> Option<UserIdentity> {
        let token = self.store.read().await?;

        match self.api.whoami().await {
            Ok(identity) => {
                self.api.set_default_bearer(Some(token.clone()));
                self.state = SessionState::Authenticated;
                self.current_user = Some(identity.clone());
                self.raw_token = Some(token);
                info!("Session resumed for '{}'", identity.email);
                Some(identity)
            }
            Err(err) => {
                debug!("Stored token was not confirmed: {}", err.message());
                None
            }
        }
    }

    pub fn current_identity(&self) -> Option<&UserIdentity> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn view(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            current_user: self.current_user.clone(),
        }
    }

    fn reset_session(&mut self) {
        self.state = SessionState::Anonymous;
        self.current_user = None;
        self.raw_token = None;
    }
}
