//! Shared configuration for domoplug consumers.
//!
//! TOML plug profiles, environment-variable credential resolution, and
//! translation to `domoplug_core::PlugRegistry`. The core never reads
//! config files -- consumers load a [`Config`] here and hand the
//! registry in.
//!
//! ```toml
//! [defaults]
//! timeout = 10
//! insecure = false
//!
//! [[plugs]]
//! address = "10.0.0.5:8080"
//! idx = "2"
//! label = "Printer PSU"
//! username = "admin"
//! password_env = "DOMOTICZ_PASSWORD"
//! gcode_enabled = true
//! warn_printing = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use domoplug_core::{PlugConfig, PlugRegistry, RelayCredentials, TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Configured plugs, in precedence order (first match wins).
    #[serde(default)]
    pub plugs: Vec<PlugProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates for every plug.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: false,
        }
    }
}

fn default_timeout() -> u64 {
    10
}

/// One configured plug.
#[derive(Debug, Deserialize, Serialize)]
pub struct PlugProfile {
    /// Controller address (scheme optional, `http://` assumed).
    pub address: String,

    /// Domoticz device idx.
    pub idx: String,

    /// Display name for logs and listings.
    #[serde(default)]
    pub label: String,

    /// Username for HTTP basic auth.
    pub username: Option<String>,

    /// Password (plaintext -- prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Protected-switch passcode (plaintext -- prefer `passcode_env`).
    pub passcode: Option<String>,

    /// Environment variable holding the passcode.
    pub passcode_env: Option<String>,

    /// Skip TLS verification for this plug only.
    #[serde(default)]
    pub ignore_tls: bool,

    #[serde(default = "default_true")]
    pub auto_connect: bool,
    #[serde(default = "default_connect_delay")]
    pub auto_connect_delay: u64,

    #[serde(default = "default_true")]
    pub auto_disconnect: bool,
    #[serde(default)]
    pub auto_disconnect_delay: u64,

    /// Local command run after power-on.
    pub on_command: Option<String>,
    #[serde(default)]
    pub on_command_delay: u64,

    /// Local command run around power-off.
    pub off_command: Option<String>,
    #[serde(default)]
    pub off_command_delay: u64,

    #[serde(default)]
    pub gcode_enabled: bool,
    #[serde(default)]
    pub gcode_on_delay: u64,
    #[serde(default)]
    pub gcode_off_delay: u64,

    /// Suppress power-off while a print is running.
    #[serde(default)]
    pub warn_printing: bool,
}

fn default_true() -> bool {
    true
}
fn default_connect_delay() -> u64 {
    10
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "domoplug", "domoplug").map_or_else(
        || PathBuf::from("domoplug.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load configuration from `path`, layered with `DOMOPLUG_*` env vars.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DOMOPLUG_").split("__"))
        .extract()?;
    Ok(config)
}

/// Load from the default path. A missing file yields the defaults
/// (layered with env vars); a file that exists but fails to parse is
/// an error, never silently an empty config.
pub fn load_config_or_default() -> Result<Config, ConfigError> {
    load_config(&config_path())
}

// ── Translation to core types ───────────────────────────────────────

impl Config {
    /// Build the core registry from this config, resolving env-var
    /// credentials from the process environment.
    pub fn registry(&self) -> Result<PlugRegistry, ConfigError> {
        self.registry_with_env(|name| std::env::var(name).ok())
    }

    /// As [`registry`](Self::registry), with an injectable environment
    /// lookup.
    pub fn registry_with_env(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<PlugRegistry, ConfigError> {
        self.plugs
            .iter()
            .map(|p| p.to_plug(&lookup))
            .collect::<Result<Vec<_>, _>>()
            .map(PlugRegistry::new)
    }

    /// Transport settings shared by every plug client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: if self.defaults.insecure {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
            timeout: Duration::from_secs(self.defaults.timeout),
        }
    }
}

impl PlugProfile {
    fn to_plug(
        &self,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<PlugConfig, ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "address".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.idx.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "idx".into(),
                reason: "must not be empty".into(),
            });
        }

        let mut plug = PlugConfig::new(self.address.clone(), self.idx.clone());
        plug.label = self.label.clone();
        plug.credentials = self.credentials(lookup)?;
        plug.ignore_tls = self.ignore_tls;
        plug.auto_connect = self.auto_connect;
        plug.auto_connect_delay = self.auto_connect_delay;
        plug.auto_disconnect = self.auto_disconnect;
        plug.auto_disconnect_delay = self.auto_disconnect_delay;
        if let Some(ref cmd) = self.on_command {
            plug.sys_cmd_on = true;
            plug.sys_run_cmd_on = cmd.clone();
            plug.sys_cmd_on_delay = self.on_command_delay;
        }
        if let Some(ref cmd) = self.off_command {
            plug.sys_cmd_off = true;
            plug.sys_run_cmd_off = cmd.clone();
            plug.sys_cmd_off_delay = self.off_command_delay;
        }
        plug.gcode_enabled = self.gcode_enabled;
        plug.gcode_on_delay = self.gcode_on_delay;
        plug.gcode_off_delay = self.gcode_off_delay;
        plug.warn_printing = self.warn_printing;
        Ok(plug)
    }

    fn credentials(
        &self,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<RelayCredentials, ConfigError> {
        let password = resolve_secret(
            self.password.as_deref(),
            self.password_env.as_deref(),
            "password_env",
            lookup,
        )?;
        let passcode = resolve_secret(
            self.passcode.as_deref(),
            self.passcode_env.as_deref(),
            "passcode_env",
            lookup,
        )?;

        let mut credentials = match (&self.username, password) {
            (Some(username), Some(password)) => {
                RelayCredentials::basic(username.clone(), password)
            }
            (Some(_), None) => {
                return Err(ConfigError::Validation {
                    field: "password".into(),
                    reason: format!(
                        "username set for plug '{}' but no password or password_env",
                        self.idx
                    ),
                });
            }
            (None, _) => RelayCredentials::none(),
        };
        if let Some(passcode) = passcode {
            credentials = credentials.with_passcode(passcode);
        }
        Ok(credentials)
    }

}

/// Plaintext value wins over env var; a named but unset env var is a
/// validation error, not a silent fallthrough.
fn resolve_secret(
    plain: Option<&str>,
    env_name: Option<&str>,
    field: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<String>, ConfigError> {
    if let Some(value) = plain {
        return Ok(Some(value.to_string()));
    }
    match env_name {
        Some(name) => match lookup(name) {
            Some(value) => Ok(Some(value)),
            None => Err(ConfigError::Validation {
                field: field.into(),
                reason: format!("environment variable {name} is not set"),
            }),
        },
        None => Ok(None),
    }
}
