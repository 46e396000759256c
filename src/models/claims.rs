use serde_json::Value;

use crate::errors::VerificationError;
use crate::models::UserIdentity;

/// Normalize a decoded claim set into a [`UserIdentity`].
///
/// The backend has issued two claim shapes over time: a flat layout with the
/// identity fields at the top level, and a wrapped layout where they sit
/// under a `payload` object. If a `payload` object is present the whole
/// identity is read from it; otherwise the top level is used. The two
/// shapes are never mixed.
pub fn normalize_claims(claims: &Value) -> Result<UserIdentity, VerificationError> {
    let source = match claims.get("payload") {
        Some(inner) if inner.is_object() => inner,
        _ => claims,
    };

    serde_json::from_value(source.clone()).map_err(|err| {
        tracing::debug!("Claim set rejected during normalization: {}", err);
        VerificationError::MalformedClaims
    })
}
