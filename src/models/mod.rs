pub mod claims;
pub mod user;

pub use claims::normalize_claims;
pub use user::{Role, UserIdentity};
