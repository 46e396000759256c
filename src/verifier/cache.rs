use std::sync::Mutex;

use tracing::debug;

use crate::errors::VerificationError;
use crate::models::UserIdentity;
use crate::verifier::base::VerifyToken;

/// Whether a cached verification answered from the slot or had to
/// re-verify. Surfaced so callers can label their metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        }
    }
}

struct CacheEntry {
    raw_token: String,
    identity: UserIdentity,
}

/// Single-slot memoization of the most recent successful verification.
///
/// The slot holds exactly one (token, identity) pair. A repeat of the same
/// raw token string is answered from the slot without touching the verifier;
/// any other token re-verifies and, on success, replaces the slot. Any
/// verification failure empties the slot so a rejected token can never be
/// answered from cache afterwards.
pub struct SessionCache {
    inner: Box<dyn VerifyToken>,
    slot: Mutex<Option<CacheEntry>>,
}

impl SessionCache {
    pub fn new(inner: Box<dyn VerifyToken>) -> Self {
        SessionCache {
            inner,
            slot: Mutex::new(None),
        }
    }

    /// Verify `raw_token`, answering from the slot when it holds the same
    /// token string.
    pub fn verify_cached(
        &self,
        raw_token: &str,
    ) -> (Result<UserIdentity, VerificationError>, CacheStatus) {
        let mut slot = self.slot.lock().unwrap();

        if let Some(entry) = slot.as_ref() {
            if entry.raw_token == raw_token {
                return (Ok(entry.identity.clone()), CacheStatus::Hit);
            }
        }

        match self.inner.verify(raw_token) {
            Ok(identity) => {
                *slot = Some(CacheEntry {
                    raw_token: raw_token.to_string(),
                    identity: identity.clone(),
                });
                (Ok(identity), CacheStatus::Miss)
            }
            Err(err) => {
                if slot.take().is_some() {
                    debug!("Cleared session cache after a failed verification");
                }
                (Err(err), CacheStatus::Miss)
            }
        }
    }

    /// Drop whatever the slot holds.
    pub fn invalidate(&self) {
        self.slot.lock().unwrap().take();
    }
}

/// The cache can stand in anywhere a plain verifier is expected.
impl VerifyToken for SessionCache {
    fn verify(&self, raw_token: &str) -> Result<UserIdentity, VerificationError> {
        self.verify_cached(raw_token).0
    }
}
