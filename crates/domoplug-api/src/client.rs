// Domoticz HTTP client
//
// Wraps `reqwest::Client` with Domoticz-specific URL construction and
// response interpretation. Each call is exactly one GET -- there is no
// retry loop; callers reconcile state by re-querying later.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::RelayCredentials;
use crate::error::Error;
use crate::models::{DevicesResponse, PowerState, SwitchResponse};
use crate::transport::TransportConfig;

/// HTTP client for one Domoticz controller.
///
/// Speaks the `json.htm` control surface: `param=switchlight` for
/// commands and `param=getdevices` (or the legacy `type=devices`) for
/// status. Basic-auth credentials ride on every request; the passcode,
/// if present, is appended to switch commands only.
pub struct RelayClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: RelayCredentials,
    /// Use the pre-2020 `type=devices&rid=` status endpoint.
    legacy_status: bool,
}

impl RelayClient {
    /// Create a client for the controller at `base_url`.
    pub fn new(
        base_url: Url,
        credentials: RelayCredentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            legacy_status: false,
        })
    }

    /// Create a client from a bare address as configured on a plug.
    ///
    /// Plug addresses are usually written without a scheme
    /// (`192.168.1.7:8080`); those are normalized to `http://`.
    pub fn from_address(
        address: &str,
        credentials: RelayCredentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = normalize_address(address)?;
        Self::new(base_url, credentials, transport)
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: RelayCredentials,
    ) -> Self {
        Self {
            http,
            base_url,
            credentials,
            legacy_status: false,
        }
    }

    /// Switch to the legacy `type=devices&rid=` status endpoint.
    pub fn with_legacy_status(mut self) -> Self {
        self.legacy_status = true;
        self
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/json.htm` with no query parameters yet.
    fn api_url(&self) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/json.htm")).expect("invalid API URL")
    }

    /// Switch command URL:
    /// `json.htm?type=command&param=switchlight&idx={idx}&switchcmd=On|Off[&passcode=...]`
    fn switch_url(&self, idx: &str, on: bool) -> Url {
        let mut url = self.api_url();
        url.query_pairs_mut()
            .append_pair("type", "command")
            .append_pair("param", "switchlight")
            .append_pair("idx", idx)
            .append_pair("switchcmd", if on { "On" } else { "Off" });
        if let Some(ref passcode) = self.credentials.passcode {
            url.query_pairs_mut()
                .append_pair("passcode", passcode.expose_secret());
        }
        url
    }

    /// Device status URL: `json.htm?type=command&param=getdevices&rid={idx}`,
    /// or `json.htm?type=devices&rid={idx}` for legacy controllers.
    fn status_url(&self, idx: &str) -> Url {
        let mut url = self.api_url();
        if self.legacy_status {
            url.query_pairs_mut()
                .append_pair("type", "devices")
                .append_pair("rid", idx);
        } else {
            url.query_pairs_mut()
                .append_pair("type", "command")
                .append_pair("param", "getdevices")
                .append_pair("rid", idx);
        }
        url
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Switch device `idx` on or off.
    ///
    /// Success is a JSON body with `"status": "OK"`. Anything else --
    /// non-2xx, non-JSON, or a non-OK status field -- is an error.
    pub async fn set_power(&self, idx: &str, on: bool) -> Result<(), Error> {
        let url = self.switch_url(idx, on);
        let resp: SwitchResponse = self.get(url).await?;

        if resp.status == "OK" {
            debug!(idx, on, "switch command accepted");
            Ok(())
        } else {
            Err(Error::Api {
                message: format!(
                    "switch command rejected for idx {idx}: status={}",
                    resp.status
                ),
            })
        }
    }

    /// Query the current state of device `idx`.
    ///
    /// Maps the device `Status` string `On`/`Off` to a [`PowerState`];
    /// any other status string is `Unknown`. A response with no matching
    /// device record is an error.
    pub async fn device_status(&self, idx: &str) -> Result<PowerState, Error> {
        let url = self.status_url(idx);
        let resp: DevicesResponse = self.get(url).await?;

        let Some(entry) = resp.result.first() else {
            return Err(Error::Api {
                message: format!("status query returned no result for idx {idx}"),
            });
        };

        let state = entry
            .status
            .as_deref()
            .map_or(PowerState::Unknown, PowerState::from_device_status);
        debug!(idx, %state, "device status");
        Ok(state)
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Send a GET and deserialize the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let mut request = self.http.get(url);
        if let Some(ref basic) = self.credentials.basic {
            request = request.basic_auth(&basic.username, Some(basic.password.expose_secret()));
        }

        let resp = request.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let preview: String = body.chars().take(200).collect();
            return Err(Error::Api {
                message: format!("HTTP {status}: {preview}"),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Normalize a configured plug address to a base URL.
///
/// Addresses without a scheme get `http://` prepended; Domoticz installs
/// default to plain HTTP on the LAN.
pub fn normalize_address(address: &str) -> Result<Url, Error> {
    let trimmed = address.trim();
    if trimmed.contains("://") {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("http://{trimmed}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_bare_host() {
        let url = normalize_address("192.168.1.7:8080").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.7:8080/");
    }

    #[test]
    fn normalize_keeps_scheme() {
        let url = normalize_address("https://domoticz.local").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(normalize_address("").is_err());
    }

    #[test]
    fn switch_url_shape() {
        let client = RelayClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://10.0.0.5:8080").unwrap(),
            RelayCredentials::none(),
        );
        let url = client.switch_url("2", true);
        assert_eq!(url.path(), "/json.htm");
        let query = url.query().unwrap();
        assert!(query.contains("param=switchlight"));
        assert!(query.contains("idx=2"));
        assert!(query.contains("switchcmd=On"));
        assert!(!query.contains("passcode"));
    }

    #[test]
    fn switch_url_appends_passcode() {
        let client = RelayClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://10.0.0.5:8080").unwrap(),
            RelayCredentials::none().with_passcode("1234".to_string()),
        );
        let url = client.switch_url("2", false);
        assert!(url.query().unwrap().contains("passcode=1234"));
        assert!(url.query().unwrap().contains("switchcmd=Off"));
    }

    #[test]
    fn status_url_legacy_form() {
        let client = RelayClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://10.0.0.5:8080").unwrap(),
            RelayCredentials::none(),
        )
        .with_legacy_status();
        let query = client.status_url("7").query().unwrap().to_string();
        assert!(query.contains("type=devices"));
        assert!(query.contains("rid=7"));
        assert!(!query.contains("getdevices"));
    }
}
