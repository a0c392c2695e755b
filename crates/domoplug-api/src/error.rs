use thiserror::Error;

/// Top-level error type for the `domoplug-api` crate.
///
/// Covers every failure mode at the HTTP boundary: transport, URL
/// construction, TLS setup, and remote-side rejections. `domoplug-core`
/// downgrades all of these to an `unknown` state notification -- they
/// never surface as hard faults to the plugin host.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error (bad plug address).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client-build error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Remote API ──────────────────────────────────────────────────
    /// The controller answered but rejected the request (non-OK status
    /// field, non-2xx HTTP code, or an empty result set).
    #[error("Domoticz API error: {message}")]
    Api { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a network-level failure (as opposed to
    /// a well-formed rejection from the controller).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_))
    }
}
