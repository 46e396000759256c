//! Error taxonomy shared by the verifier, the session controller, and the
//! gateway routes.

use thiserror::Error;

/// Why a presented token was not accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// No token was found in any storage slot or request header.
    #[error("no token presented")]
    NoToken,

    /// The signature/integrity check failed under the shared secret.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The signature is fine but the token is past its expiry.
    #[error("token has expired")]
    Expired,

    /// The payload decoded but the expected claims could not be extracted.
    #[error("token claims are malformed")]
    MalformedClaims,

    /// The role claim is valid but not in the allow-list for this boundary.
    #[error("role '{role}' is not authorized for this boundary")]
    UnauthorizedRole { role: String },
}

impl VerificationError {
    /// Short label used for metrics and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            VerificationError::NoToken => "no_token",
            VerificationError::InvalidSignature => "invalid_signature",
            VerificationError::Expired => "expired",
            VerificationError::MalformedClaims => "malformed_claims",
            VerificationError::UnauthorizedRole { .. } => "unauthorized_role",
        }
    }
}

/// Why a login attempt failed.
///
/// `Rejected` carries the server-provided message verbatim so the UI can
/// attach it to the form's error state; transport problems collapse into
/// `Network` with a generic message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Rejected { message: String },
}

/// Fallback message when the server rejects a login without a usable payload.
pub const GENERIC_LOGIN_FAILURE: &str = "Login failed";

/// Fallback message for transport-level failures.
pub const GENERIC_NETWORK_FAILURE: &str = "An unexpected error occurred";

impl LoginError {
    /// The message to surface to the form's error state.
    pub fn message(&self) -> &str {
        match self {
            LoginError::Network(msg) => msg,
            LoginError::Rejected { message } => message,
        }
    }
}

/// Pass/fail outcome of the login-form credential checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);
