use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Permission tier carried in a token's role claim.
///
/// Roles are opaque strings at this layer; the boundary allow-list decides
/// which of them may pass. The constants cover the set the backend is known
/// to issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const SELLER: Role = Role(Cow::Borrowed("seller"));
    pub const USER: Role = Role(Cow::Borrowed("user"));
    pub const GUEST: Role = Role(Cow::Borrowed("guest"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Role(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Role::new(name.to_string())
    }
}

/// The identity every boundary works with once a token has been accepted.
///
/// Produced by claim normalization on the verifying side and by the login
/// response on the client side. Identity fields a token does not carry
/// default to empty; the role claim is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub id: String,
    /// Display name; the backend serializes it as `firstName`.
    #[serde(default, alias = "firstName")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

impl UserIdentity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        UserIdentity {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}
