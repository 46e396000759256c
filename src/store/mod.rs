pub mod base;
pub mod cookie;
pub mod durable;
pub mod ephemeral;

// Re-export the primary store items so code outside can do
// "use crate::store::{TokenStore, create_store};"
pub use base::{create_store, StorageSlot, StoreConfig, TokenStore};
pub use cookie::{
    clearing_cookie_header, set_cookie_header, token_from_cookie_header, CookieSlot,
    SESSION_COOKIE_NAME,
};
pub use durable::FileSlot;
pub use ephemeral::MemorySlot;
