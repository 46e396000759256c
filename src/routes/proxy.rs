//! Fallback relay to the upstream dashboard.
//!
//! Anything that is not a gateway endpoint is forwarded to the configured
//! upstream with method, query, headers and body preserved. The edge guard
//! has already run by the time a protected request reaches this handler.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::metrics::MetricsRecorder;
use crate::models::UserIdentity;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Largest request body the relay will buffer.
const RELAY_BODY_LIMIT: usize = 10 * 1024 * 1024;

const X_REQUEST_ID: &str = "x-request-id";

/// Connection-scoped headers that must not travel through the relay.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Relay the request to the upstream base URL and mirror the response.
pub async fn relay(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.config.upstream.base_url, path_and_query);

    let mut headers = HeaderMap::new();
    for (name, value) in parts.headers.iter() {
        // Host and content-length are recomputed for the new connection.
        if is_hop_by_hop(name) || name == "host" || name == "content-length" {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if !headers.contains_key(X_REQUEST_ID) {
        let request_id = Uuid::new_v4().to_string();
        headers.insert(
            HeaderName::from_static(X_REQUEST_ID),
            HeaderValue::from_str(&request_id).unwrap(),
        );
    }

    if state.config.include_identity_headers.unwrap_or(false) {
        if let Some(identity) = parts.extensions.get::<UserIdentity>() {
            append_identity_headers(&mut headers, identity);
        }
    }

    let body = match axum::body::to_bytes(body, RELAY_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Could not buffer the request body for relay: {}", err);
            return HTTPError::new(StatusCode::BAD_REQUEST, "Request body could not be read")
                .into_response();
        }
    };

    debug!("Relaying {} {} upstream", parts.method, path_and_query);
    let upstream_response = match state
        .upstream
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            warn!("Relay to '{}' failed: {}", url, err);
            state.metrics.record_relay("error");
            return HTTPError::new(StatusCode::BAD_GATEWAY, "Upstream relay failed")
                .into_response();
        }
    };

    let status = upstream_response.status();
    state.metrics.record_relay(status_class(status));

    let mut builder = Response::builder().status(status);
    if let Some(response_headers) = builder.headers_mut() {
        for (name, value) in upstream_response.headers().iter() {
            if is_hop_by_hop(name) || name == "content-length" {
                continue;
            }
            response_headers.append(name.clone(), value.clone());
        }
    }

    let bytes = match upstream_response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Upstream response body could not be read: {}", err);
            return HTTPError::new(StatusCode::BAD_GATEWAY, "Upstream relay failed")
                .into_response();
        }
    };

    builder.body(Body::from(bytes)).unwrap()
}

/// Forward the verified identity upstream, in the same spirit as legacy
/// auth headers: one header per field, skipped when a value cannot be
/// carried in a header.
fn append_identity_headers(headers: &mut HeaderMap, identity: &UserIdentity) {
    let fields = [
        ("x-auth-id", identity.id.as_str()),
        ("x-auth-name", identity.name.as_str()),
        ("x-auth-email", identity.email.as_str()),
        ("x-auth-role", identity.role.as_str()),
    ];
    for (name, value) in fields {
        if value.is_empty() {
            continue;
        }
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.append(HeaderName::from_static(name), value);
        }
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        _ => "5xx",
    }
}
