// ── Core error types ──
//
// Host-facing errors from domoplug-core. HTTP-level failures from
// domoplug-api are wrapped, but in the dispatch paths they are logged
// and downgraded to an `unknown` state notification rather than
// propagated -- only the authorization check produces a hard rejection.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller lacks the control permission. The host maps this to an
    /// HTTP 403-equivalent rejection.
    #[error("Insufficient rights")]
    Unauthorized,

    /// No plug configured for the given address/idx pair.
    #[error("No plug configured for {address} idx {idx}")]
    PlugNotFound { address: String, idx: String },

    /// A local command could not be spawned or exited non-zero.
    #[error("Local command failed: {message}")]
    Command { message: String },

    /// Wrapped HTTP-boundary error.
    #[error("Relay API error: {0}")]
    Api(#[from] domoplug_api::Error),

    /// Invalid plug configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}
