//! Library exports for sessiongate, shared between the binary and tests.

pub mod client;
pub mod config;
pub mod errors;
pub mod guard;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
pub mod verifier;
