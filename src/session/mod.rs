pub mod controller;
pub mod credentials;

pub use controller::{SessionController, SessionSnapshot, SessionState};
pub use credentials::Credentials;
