//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    /// The plug ended up in an unknown state (unreachable controller or
    /// rejected command).
    pub const UNKNOWN_STATE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No plug configured for {address} idx {idx}")]
    #[diagnostic(
        code(domoplug::plug_not_found),
        help(
            "List configured plugs with: domoplug plugs\n\
             Plugs are defined in {config_path}"
        )
    )]
    PlugNotFound {
        address: String,
        idx: String,
        config_path: String,
    },

    #[error("Plug {address} idx {idx} is in an unknown state")]
    #[diagnostic(
        code(domoplug::unknown_state),
        help(
            "The controller could not be reached or rejected the command.\n\
             Re-run with -vv to see the request log."
        )
    )]
    UnknownState { address: String, idx: String },

    #[error("Configuration error")]
    #[diagnostic(code(domoplug::config))]
    Config {
        #[source]
        source: domoplug_config::ConfigError,
    },

    #[error("Config file not found: {path}")]
    #[diagnostic(
        code(domoplug::no_config),
        help("Create it, or pass --config / set DOMOPLUG_CONFIG.")
    )]
    NoConfig { path: String },

    #[error("Could not read {path}")]
    #[diagnostic(code(domoplug::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Map this error to a process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PlugNotFound { .. } => exit_code::NOT_FOUND,
            Self::UnknownState { .. } => exit_code::UNKNOWN_STATE,
            Self::Config { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Io { .. } => exit_code::GENERAL,
        }
    }
}

impl From<domoplug_config::ConfigError> for CliError {
    fn from(source: domoplug_config::ConfigError) -> Self {
        Self::Config { source }
    }
}
