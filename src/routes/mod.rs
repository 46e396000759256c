//! HTTP route definitions and handlers.
//!
//! This module organizes all HTTP endpoints into logical groups:
//! login passthrough, session introspection, health checks, metrics, and
//! the upstream relay behind the guard.

mod auth_routes;
mod health_routes;
mod metrics_routes;
mod proxy;
mod session_routes;

use crate::guard::guard_middleware;
use crate::state::AppState;
use axum::middleware;
use axum::Router;

/// Creates the application router with all configured routes.
///
/// Combines all route modules into a single router, relays everything else
/// to the upstream dashboard, and wraps the whole surface in the edge
/// guard (which only acts on configured protected paths).
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes::routes())
        .merge(session_routes::routes())
        .merge(health_routes::routes())
        .merge(metrics_routes::routes())
        .fallback(proxy::relay)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard_middleware,
        ))
        .with_state(state)
}
