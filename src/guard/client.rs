use tracing::debug;

use crate::guard::GuardDecision;
use crate::store::TokenStore;

/// Client-side page guard, run before rendering a protected view.
///
/// Deliberately weaker than the edge guard: the client holds no secret, so
/// it only checks the authenticated flag and token presence. Signature and
/// role checks happen at the edge.
pub async fn page_decision(is_authenticated: bool, store: &TokenStore) -> GuardDecision {
    if is_authenticated {
        return GuardDecision::Proceed;
    }
    match store.read().await {
        Some(_) => GuardDecision::Proceed,
        None => {
            debug!("No session anywhere; the page redirects to sign-in");
            GuardDecision::RedirectToSignIn
        }
    }
}
