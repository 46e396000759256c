use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::base::StorageSlot;

/// Cookie the session token rides on, shared between the client store and
/// the gateway's Set-Cookie responses.
pub const SESSION_COOKIE_NAME: &str = "token";

/// One day, matching the token lifetime the backend issues.
const SESSION_COOKIE_MAX_AGE: i64 = 86_400;

/// `Set-Cookie` value that installs the session cookie.
///
/// Deliberately not HttpOnly: the client store reads the cookie slot as a
/// fallback. `Secure` and `SameSite=Strict` still apply.
pub fn set_cookie_header(token: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; Secure; SameSite=Strict",
        SESSION_COOKIE_NAME, token, SESSION_COOKIE_MAX_AGE
    )
}

/// `Set-Cookie` value that expires the session cookie immediately.
pub fn clearing_cookie_header() -> String {
    let epoch = DateTime::<Utc>::UNIX_EPOCH.format("%a, %d %b %Y %H:%M:%S GMT");
    format!(
        "{}=; Path=/; Max-Age=0; Expires={}; Secure; SameSite=Strict",
        SESSION_COOKIE_NAME, epoch
    )
}

/// Extract a cookie's value from a request `Cookie` header. Empty values
/// count as absent.
pub fn token_from_cookie_header(header: &str, name: &str) -> Option<String> {
    for pair in header.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key.trim() == name && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// The held session cookie on the client side. Outbound requests present it
/// via [`CookieSlot::header_value`]; as a storage slot it is the last read
/// fallback.
#[derive(Default)]
pub struct CookieSlot {
    value: Mutex<Option<String>>,
}

impl CookieSlot {
    pub fn new() -> Self {
        CookieSlot::default()
    }

    /// The outbound `Cookie` header value, when a cookie is held.
    pub fn header_value(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap()
            .as_ref()
            .map(|token| format!("{}={}", SESSION_COOKIE_NAME, token))
    }
}

#[async_trait]
impl StorageSlot for CookieSlot {
    fn name(&self) -> &'static str {
        "cookie"
    }

    async fn load(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    async fn save(&self, token: &str) {
        *self.value.lock().unwrap() = Some(token.to_string());
    }

    async fn clear(&self) {
        self.value.lock().unwrap().take();
    }
}
