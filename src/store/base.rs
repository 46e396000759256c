use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cookie::CookieSlot;
use super::durable::FileSlot;
use super::ephemeral::MemorySlot;

/// One place a session token can live. Slots are infallible at this
/// surface: IO trouble is logged inside the slot and degrades to a miss.
#[async_trait]
pub trait StorageSlot: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Option<String>;
    async fn save(&self, token: &str);
    async fn clear(&self);
}

/// Slots are freely shareable behind an Arc.
#[async_trait]
impl<T: StorageSlot + ?Sized> StorageSlot for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    async fn load(&self) -> Option<String> {
        (**self).load().await
    }
    async fn save(&self, token: &str) {
        (**self).save(token).await
    }
    async fn clear(&self) {
        (**self).clear().await
    }
}

/// Store config structure for external usage.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct StoreConfig {
    /// File that backs the durable slot.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            token_path: default_token_path(),
        }
    }
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".sessiongate/token")
}

/// Client-side persistence of the session token across three slots:
/// durable (survives restarts), ephemeral (process lifetime) and the held
/// session cookie presented to the edge on outbound calls.
pub struct TokenStore {
    durable: Box<dyn StorageSlot>,
    ephemeral: Box<dyn StorageSlot>,
    cookie: CookieSlot,
}

impl TokenStore {
    pub fn new(durable: Box<dyn StorageSlot>, ephemeral: Box<dyn StorageSlot>) -> Self {
        TokenStore {
            durable,
            ephemeral,
            cookie: CookieSlot::new(),
        }
    }

    /// Read the stored token, checking durable, then ephemeral, then the
    /// held cookie. The first non-empty hit wins; the order is fixed.
    pub async fn read(&self) -> Option<String> {
        let slots: [&dyn StorageSlot; 3] = [&*self.durable, &*self.ephemeral, &self.cookie];
        for slot in slots {
            if let Some(token) = slot.load().await {
                debug!("Token read from the {} slot", slot.name());
                return Some(token);
            }
        }
        None
    }

    /// Store `token` in the durable slot when `persistent`, the ephemeral
    /// slot otherwise. The held cookie is refreshed either way so the edge
    /// boundary still has a credential to read.
    pub async fn write(&self, token: &str, persistent: bool) {
        if persistent {
            self.durable.save(token).await;
        } else {
            self.ephemeral.save(token).await;
        }
        self.cookie.save(token).await;
    }

    /// Remove the token from every slot.
    pub async fn clear(&self) {
        self.durable.clear().await;
        self.ephemeral.clear().await;
        self.cookie.clear().await;
    }

    /// The `Cookie` header value for outbound requests, when a cookie is
    /// held.
    pub fn cookie_header(&self) -> Option<String> {
        self.cookie.header_value()
    }
}

/// Creates the standard client store: file-backed durable slot plus an
/// in-memory ephemeral slot.
pub fn create_store(config: &StoreConfig) -> Arc<TokenStore> {
    info!(
        "Creating token store with durable slot at '{}'",
        config.token_path.display()
    );
    Arc::new(TokenStore::new(
        Box::new(FileSlot::new(config.token_path.clone())),
        Box::new(MemorySlot::new()),
    ))
}
