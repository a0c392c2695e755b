// Shared transport configuration for building reqwest::Client instances.
//
// Every RelayClient is built from one of these; plugs that opt out of
// certificate verification get a client with TLS checks disabled.

use std::time::Duration;

/// Default per-request timeout. Domoticz controllers sit on the local
/// network, so anything slower than this is effectively unreachable.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// TLS verification mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Accept any certificate (for self-signed controllers).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("domoplug/", env!("CARGO_PKG_VERSION")));

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Flip TLS verification off (per-plug `ignore_tls`).
    pub fn with_insecure_tls(mut self) -> Self {
        self.tls = TlsMode::DangerAcceptInvalid;
        self
    }
}
