pub mod base;
pub mod cache;
pub mod jwt;

pub use base::{create_verifier, VerifyToken};
pub use cache::SessionCache;
pub use jwt::{TokenVerifier, VerifierConfig};
