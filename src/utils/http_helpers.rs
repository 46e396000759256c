use std::net::SocketAddr;
use std::time::Instant;

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::errors::VerificationError;
use crate::guard::extract_token;
use crate::metrics::MetricsRecorder;
use crate::models::UserIdentity;
use crate::state::AppState;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }
}

/// Converts our `HTTPError` into an HTTP response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message }).to_string();
        Response::builder()
            .status(self.status)
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap()
    }
}

/// Extractor implementation: tries to convert the request parts into a
/// verified `UserIdentity`, using the same credential extraction as the
/// edge guard. Rejections are a plain 401, never a redirect.
#[async_trait]
impl FromRequestParts<AppState> for UserIdentity {
    type Rejection = HTTPError;
    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState,
    ) -> Result<UserIdentity, HTTPError> {
        // Retrieve the client IP (for logging purposes).
        let client_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let token = match extract_token(&parts.headers) {
            Some(token) => token,
            None => {
                debug!("Request from {} carried no credential", client_ip);
                state
                    .metrics
                    .record_verification(VerificationError::NoToken.label(), "miss");
                return Err(HTTPError::new(
                    StatusCode::UNAUTHORIZED,
                    VerificationError::NoToken.to_string(),
                ));
            }
        };

        let started = Instant::now();
        let (result, cache_status) = state.sessions.verify_cached(&token);
        let result_label = match &result {
            Ok(_) => "ok",
            Err(err) => err.label(),
        };
        state
            .metrics
            .record_verification(result_label, cache_status.label());
        state
            .metrics
            .record_verification_duration(started.elapsed().as_secs_f64(), result_label);

        match result {
            Ok(identity) => Ok(identity),
            Err(err) => {
                debug!("Rejected credential from {}: {}", client_ip, err);
                Err(HTTPError::new(StatusCode::UNAUTHORIZED, err.to_string()))
            }
        }
    }
}
