use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, info};

use crate::errors::VerificationError;
use crate::guard::GuardDecision;
use crate::metrics::MetricsRecorder;
use crate::state::AppState;
use crate::store::{token_from_cookie_header, SESSION_COOKIE_NAME};

/// Pull the session credential off a request: the `token` cookie first,
/// the `Authorization: Bearer` header second.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie_header) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        if let Some(token) = token_from_cookie_header(cookie_header, SESSION_COOKIE_NAME) {
            return Some(token);
        }
    }

    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, value) = auth_header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

/// Edge guard over every protected path.
///
/// Non-matching paths pass through untouched. Matching paths must present
/// a verifiable credential: absence or a failed verification redirects to
/// sign-in, an allow-list rejection redirects to the configured fallback,
/// and success attaches the verified identity to the request before it is
/// relayed.
pub async fn guard_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !state.protected.matches(&path) {
        return next.run(request).await;
    }

    let token = match extract_token(request.headers()) {
        Some(token) => token,
        None => {
            debug!("No credential on protected path '{}'", path);
            state
                .metrics
                .record_verification(VerificationError::NoToken.label(), "miss");
            return redirect(&state, &path, GuardDecision::RedirectToSignIn);
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
        Ok(identity) => {
            state
                .metrics
                .record_guard_decision(GuardDecision::Proceed.label());
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err @ VerificationError::UnauthorizedRole { .. }) => {
            info!("Role rejected on protected path '{}': {}", path, err);
            redirect(&state, &path, GuardDecision::RedirectToFallback)
        }
        Err(err) => {
            info!("Credential rejected on protected path '{}': {}", path, err);
            redirect(&state, &path, GuardDecision::RedirectToSignIn)
        }
    }
}

fn redirect(state: &AppState, path: &str, decision: GuardDecision) -> Response {
    state.metrics.record_guard_decision(decision.label());
    let target = match decision {
        GuardDecision::RedirectToFallback => state.config.guard.fallback_redirect.as_str(),
        _ => state.config.guard.signin_path.as_str(),
    };
    debug!("Guard redirecting '{}' to '{}'", path, target);
    Redirect::temporary(target).into_response()
}
