// domoplug-api: Async Rust client for the Domoticz JSON switch/status API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{BasicCredentials, RelayCredentials};
pub use client::RelayClient;
pub use error::Error;
pub use models::PowerState;
pub use transport::{TlsMode, TransportConfig};
