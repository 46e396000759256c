use std::sync::{Arc, Mutex};

use http::header;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{LoginError, GENERIC_LOGIN_FAILURE, GENERIC_NETWORK_FAILURE};
use crate::models::UserIdentity;
use crate::session::Credentials;
use crate::store::TokenStore;

/// Successful login response from the API.
#[derive(Deserialize, Debug, Clone)]
pub struct LoginSuccess {
    pub user: UserIdentity,
    pub token: String,
}

/// HTTP client for the session API. Every outbound request re-reads the
/// token store and attaches `Authorization: Bearer <token>` (falling back
/// to the controller-set default credential) plus the held session cookie.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<TokenStore>,
    default_bearer: Mutex<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<TokenStore>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
            default_bearer: Mutex::new(None),
        }
    }

    /// Credential used when no token is readable from the store. The
    /// session controller sets it after login and drops it on logout.
    pub fn set_default_bearer(&self, token: Option<String>) {
        *self.default_bearer.lock().unwrap() = token;
    }

    /// Submit credentials to `POST /user/login`. Only email and password
    /// go on the wire; the remember-me flag is a storage decision.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginSuccess, LoginError> {
        let url = format!("{}/user/login", self.base_url);
        debug!("Sending login request to: {}", url);

        let request = self.authorize(self.http.post(&url)).await.json(&json!({
            "email": credentials.email,
            "password": credentials.password,
        }));

        let response = request.send().await.map_err(|err| {
            warn!("Login request failed to reach the API: {}", err);
            LoginError::Network(GENERIC_NETWORK_FAILURE.to_string())
        })?;

        if !response.status().is_success() {
            return Err(LoginError::Rejected {
                message: rejection_message(response).await,
            });
        }

        response.json::<LoginSuccess>().await.map_err(|err| {
            warn!("Login response body could not be parsed: {}", err);
            LoginError::Network(GENERIC_NETWORK_FAILURE.to_string())
        })
    }

    /// Ask the trusted boundary who the stored credential belongs to.
    pub async fn whoami(&self) -> Result<UserIdentity, LoginError> {
        let url = format!("{}/session", self.base_url);
        debug!("Sending session introspection request to: {}", url);

        let response = self
            .authorize(self.http.get(&url))
            .await
            .send()
            .await
            .map_err(|err| {
                warn!("Session introspection failed to reach the API: {}", err);
                LoginError::Network(GENERIC_NETWORK_FAILURE.to_string())
            })?;

        if !response.status().is_success() {
            return Err(LoginError::Rejected {
                message: rejection_message(response).await,
            });
        }

        response.json::<UserIdentity>().await.map_err(|err| {
            warn!("Session introspection body could not be parsed: {}", err);
            LoginError::Network(GENERIC_NETWORK_FAILURE.to_string())
        })
    }

    /// Gated fetch of an arbitrary API path, with the session credentials
    /// attached.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, LoginError> {
        let url = format!("{}{}", self.base_url, path);
        self.authorize(self.http.get(&url))
            .await
            .send()
            .await
            .map_err(|err| {
                warn!("Request to '{}' failed: {}", path, err);
                LoginError::Network(GENERIC_NETWORK_FAILURE.to_string())
            })
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut request = request;

        let bearer = match self.store.read().await {
            Some(token) => Some(token),
            None => self.default_bearer.lock().unwrap().clone(),
        };
        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(cookie) = self.store.cookie_header() {
            request = request.header(header::COOKIE, cookie);
        }
        request
    }
}

/// Pull the server's `message` out of a rejection body, falling back to
/// the generic login failure.
async fn rejection_message(response: reqwest::Response) -> String {
    let status = response.status();
    let message = match response.json::<Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(Value::as_str)
            .map(|s| s.to_string()),
        Err(_) => None,
    };
    debug!(
        "API rejected the request with status {} ({})",
        status,
        message.as_deref().unwrap_or("no message")
    );
    message.unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string())
}
