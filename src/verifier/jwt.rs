use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::VerificationError;
use crate::models::{normalize_claims, Role, UserIdentity};
use crate::verifier::base::VerifyToken;

/// Verifier config structure for external usage.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct VerifierConfig {
    /// Shared HS256 secret. Must match the key the backend signs with.
    pub secret: String,
    /// Roles allowed through protected boundaries.
    #[serde(default = "default_allowed_roles")]
    pub allowed_roles: Vec<String>,
}

fn default_allowed_roles() -> Vec<String> {
    vec!["admin".to_string(), "seller".to_string()]
}

/// Verifies HS256-signed tokens against the shared secret, normalizes the
/// claims and gates the carried role against the allow-list.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    allowed: Vec<Role>,
}

impl TokenVerifier {
    /// Creates a new TokenVerifier with the given config.
    pub fn new(config: &VerifierConfig) -> Self {
        info!(
            "Creating token verifier with {} allowed role(s)",
            config.allowed_roles.len()
        );
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_ref()),
            validation,
            allowed: config
                .allowed_roles
                .iter()
                .map(|role| Role::new(role.clone()))
                .collect(),
        }
    }
}

impl VerifyToken for TokenVerifier {
    fn verify(&self, raw_token: &str) -> Result<UserIdentity, VerificationError> {
        let decoded = decode::<serde_json::Value>(raw_token, &self.decoding_key, &self.validation)
            .map_err(|err| {
                debug!("Token rejected during decode: {}", err);
                match err.kind() {
                    ErrorKind::ExpiredSignature => VerificationError::Expired,
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        VerificationError::InvalidSignature
                    }
                    _ => VerificationError::MalformedClaims,
                }
            })?;

        let identity = normalize_claims(&decoded.claims)?;

        if !self.allowed.contains(&identity.role) {
            debug!("Role '{}' is not on the allow-list", identity.role);
            return Err(VerificationError::UnauthorizedRole {
                role: identity.role.to_string(),
            });
        }

        Ok(identity)
    }
}
