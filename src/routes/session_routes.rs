//! Session introspection endpoint.

use axum::routing::get;
use axum::{Json, Router};

use crate::models::UserIdentity;
use crate::state::AppState;

/// Registers the session introspection route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/session", get(introspect))
}

/// Returns the verified identity behind the presented credential.
///
/// The extractor performs the same cookie-then-bearer extraction and
/// cached verification as the edge guard; a missing or rejected credential
/// is a plain 401 here, never a redirect.
async fn introspect(identity: UserIdentity) -> Json<UserIdentity> {
    Json(identity)
}
