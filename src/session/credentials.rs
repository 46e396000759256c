use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Characters the password policy accepts as "special".
const PASSWORD_SPECIALS: &str = "@$!%*?&";

const PASSWORD_POLICY_MESSAGE: &str = "Password must contain at least one uppercase letter, \
     one lowercase letter, one number, and one special character";

/// Login-form payload. `remember_me` selects the durable storage slot and
/// defaults to off, matching the form.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>, remember_me: bool) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
            remember_me,
        }
    }

    /// Check the form contract before anything leaves the process. The
    /// first failing rule wins; messages match the login form.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() {
            return Err(ValidationError("Email is required".to_string()));
        }
        if !is_well_formed_email(&self.email) {
            return Err(ValidationError("Please enter a valid email".to_string()));
        }
        if self.password.is_empty() {
            return Err(ValidationError("Password is required".to_string()));
        }
        if self.password.chars().count() < 8 {
            return Err(ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if !password_meets_policy(&self.password) {
            return Err(ValidationError(PASSWORD_POLICY_MESSAGE.to_string()));
        }
        Ok(())
    }
}

/// Structural email check: one `@`, a non-empty local part, and a dotted
/// domain with an alphabetic top level.
fn is_well_formed_email(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || candidate.contains(' ') || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Lowercase, uppercase, digit and a special, drawn only from the allowed
/// alphabet.
fn password_meets_policy(password: &str) -> bool {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut special = false;
    for c in password.chars() {
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            c if PASSWORD_SPECIALS.contains(c) => special = true,
            _ => return false,
        }
    }
    lower && upper && digit && special
}
