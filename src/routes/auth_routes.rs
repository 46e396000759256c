//! Login passthrough and logout endpoints.
//!
//! These speak the upstream API's message shape (`{"message": ...}`) so a
//! client talking through the gateway sees the same rejections it would
//! see talking to the API directly.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::errors::{GENERIC_LOGIN_FAILURE, GENERIC_NETWORK_FAILURE};
use crate::metrics::MetricsRecorder;
use crate::session::Credentials;
use crate::state::AppState;
use crate::store::{clearing_cookie_header, set_cookie_header};

/// Registers login and logout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/login", post(login))
        .route("/user/logout", post(logout))
}

/// Forwards a login to the upstream API and installs the session cookie on
/// success.
///
/// The form contract is enforced here before anything goes upstream; a
/// rejecting upstream has its status and message mirrored back; transport
/// failures surface as 502 with the generic message. No role check on this
/// boundary.
async fn login(State(state): State<AppState>, Json(credentials): Json<Credentials>) -> Response {
    if let Err(err) = credentials.validate() {
        debug!("Login rejected before forwarding: {}", err);
        state.metrics.record_login_attempt("invalid_payload");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": err.to_string() })),
        )
            .into_response();
    }

    let url = format!("{}/user/login", state.config.upstream.base_url);
    let upstream_response = match state
        .upstream
        .post(&url)
        .json(&json!({
            "email": credentials.email,
            "password": credentials.password,
        }))
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            warn!("Login could not reach the upstream API: {}", err);
            state.metrics.record_login_attempt("upstream_unreachable");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "message": GENERIC_NETWORK_FAILURE })),
            )
                .into_response();
        }
    };

    let status = upstream_response.status();
    if !status.is_success() {
        let message = upstream_response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string());
        debug!("Upstream rejected the login with {}: {}", status, message);
        state.metrics.record_login_attempt("rejected");
        return (status, Json(json!({ "message": message }))).into_response();
    }

    let body = match upstream_response.json::<Value>().await {
        Ok(body) => body,
        Err(err) => {
            warn!("Upstream login response could not be parsed: {}", err);
            state.metrics.record_login_attempt("invalid_upstream");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "message": GENERIC_NETWORK_FAILURE })),
            )
                .into_response();
        }
    };

    let Some(token) = body.get("token").and_then(Value::as_str) else {
        warn!("Upstream login response carried no token");
        state.metrics.record_login_attempt("invalid_upstream");
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "message": GENERIC_NETWORK_FAILURE })),
        )
            .into_response();
    };

    info!("Login succeeded; installing the session cookie");
    state.metrics.record_login_attempt("success");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, set_cookie_header(token))],
        Json(body),
    )
        .into_response()
}

/// Expires the session cookie. Purely local to the gateway and always
/// succeeds; the token itself stays valid until its expiry.
async fn logout() -> impl IntoResponse {
    info!("Logout; expiring the session cookie");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clearing_cookie_header())],
        Json(json!({ "message": "Logged out" })),
    )
}
