pub mod base;
pub mod client;
pub mod edge;
pub mod matcher;

pub use base::{GuardConfig, GuardDecision};
pub use client::page_decision;
pub use edge::{extract_token, guard_middleware};
pub use matcher::ProtectedPaths;
