//! Shared application state.
//!
//! Contains the state that is shared across all request handlers,
//! including configuration, token verification, and the upstream client.

use crate::config::ConfigV1;
use crate::guard::ProtectedPaths;
use crate::metrics::Metrics;
use crate::verifier::SessionCache;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// This state is cloned for each request handler and contains
/// references to the configuration, session verification, and metrics.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Cached token verification; the only secret-bearing component.
    pub sessions: Arc<SessionCache>,
    /// Compiled protected-path matcher for the edge guard.
    pub protected: Arc<ProtectedPaths>,
    /// Prometheus metrics shared by guard, routes and relay.
    pub metrics: Metrics,
    /// HTTP client used to relay guarded traffic upstream.
    pub upstream: reqwest::Client,
}
