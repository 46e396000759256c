//! Application startup and server initialization.
//!
//! This module handles the creation and configuration of the HTTP server,
//! including the verifier, path matcher, metrics, and route setup.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ConfigV1;
use crate::guard::ProtectedPaths;
use crate::metrics::Metrics;
use crate::routes;
use crate::state::AppState;
use crate::verifier::{create_verifier, SessionCache};

/// Build the shared state out of the loaded configuration.
///
/// Exits if the config cannot produce a working gateway: a blank
/// verification secret or an uncompilable protected-path pattern.
pub fn build_state(config: Arc<ConfigV1>) -> AppState {
    if config.verifier.secret.trim().is_empty() {
        error!("verifier.secret is empty; refusing to start without a verification key");
        std::process::exit(1);
    }

    let protected = match ProtectedPaths::new(&config.guard.protected_paths) {
        Ok(matcher) => Arc::new(matcher),
        Err(e) => {
            error!("Invalid protected path pattern: {}", e);
            std::process::exit(1);
        }
    };

    let sessions = Arc::new(SessionCache::new(create_verifier(&config.verifier)));

    AppState {
        config,
        sessions,
        protected,
        metrics: Metrics::new(),
        upstream: reqwest::Client::new(),
    }
}

/// Initializes and runs the gateway server.
///
/// Builds the shared state and router, binds to the configured address
/// and starts serving requests with per-connection client info.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone());

    info!("Starting server on {}", config.bind_address);

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .expect("Could not bind to specified address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();

    Ok(())
}
