use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What a guard decided to do with a request or page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    RedirectToSignIn,
    RedirectToFallback,
}

impl GuardDecision {
    /// Short label used for metrics and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            GuardDecision::Proceed => "proceed",
            GuardDecision::RedirectToSignIn => "redirect_sign_in",
            GuardDecision::RedirectToFallback => "redirect_fallback",
        }
    }
}

/// Guard config structure for external usage.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct GuardConfig {
    /// Glob-style path patterns the guard protects. A pattern ending in
    /// `/**` also covers its root path.
    #[serde(default = "default_protected_paths")]
    pub protected_paths: Vec<String>,
    /// Where unauthenticated traffic is sent.
    #[serde(default = "default_signin_path")]
    pub signin_path: String,
    /// Where traffic with a valid token but an unauthorized role is sent.
    #[serde(default = "default_fallback_redirect")]
    pub fallback_redirect: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            protected_paths: default_protected_paths(),
            signin_path: default_signin_path(),
            fallback_redirect: default_fallback_redirect(),
        }
    }
}

fn default_protected_paths() -> Vec<String> {
    ["/", "/apps/**", "/table/**", "/users/**"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_signin_path() -> String {
    "/auth/boxed-signin".to_string()
}

fn default_fallback_redirect() -> String {
    "http://localhost:4000".to_string()
}
