//! Health check endpoint.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Registers the health check route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe for the gateway itself; says nothing about the upstream.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
