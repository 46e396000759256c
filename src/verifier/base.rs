use crate::errors::VerificationError;
use crate::models::UserIdentity;

use super::jwt::{TokenVerifier, VerifierConfig};

/// A verifier inspects a raw token and either produces the identity it
/// carries or reports precisely why it was rejected.
///
/// Verification is pure computation over the token string, so the trait is
/// synchronous; implementations must not block on IO.
pub trait VerifyToken: Send + Sync {
    fn verify(&self, raw_token: &str) -> Result<UserIdentity, VerificationError>;
}

/// Create a token verifier from the given config.
pub fn create_verifier(config: &VerifierConfig) -> Box<dyn VerifyToken> {
    Box::new(TokenVerifier::new(config))
}
