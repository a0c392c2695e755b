// ── API command surface ──
//
// The host's external API (e.g. an HTTP plugin endpoint) deserializes
// caller payloads into `ApiCommand` and hands them to the `CommandGate`.
// The gate enforces the control permission before any side effect --
// including local command execution, which shares the same check.

use serde::{Deserialize, Serialize};
use tracing::debug;

use domoplug_api::PowerState;

use crate::dispatcher::PowerDispatcher;
use crate::error::CoreError;

/// Named operations accepted from the host's API surface.
///
/// Serializes with a `command` tag, matching the host's JSON payloads:
/// `{"command": "turnOn", "address": "...", "idx": "..."}`.
///
/// Per-call credentials are deliberately not accepted here; auth
/// material always comes from the matched plug configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum ApiCommand {
    TurnOn { address: String, idx: String },
    TurnOff { address: String, idx: String },
    CheckStatus { address: String, idx: String },
    ConnectPrinter,
    DisconnectPrinter,
    SysCommand { cmd: String },
}

/// Identity of an API caller, as vouched for by the host.
pub trait Caller: Send + Sync {
    /// Does this caller hold the plug-control permission?
    fn has_control_permission(&self) -> bool;
}

/// Authorization boundary in front of the dispatcher.
pub struct CommandGate {
    dispatcher: PowerDispatcher,
}

impl CommandGate {
    pub fn new(dispatcher: PowerDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &PowerDispatcher {
        &self.dispatcher
    }

    /// Execute an API command on behalf of `caller`.
    ///
    /// Unauthorized callers get [`CoreError::Unauthorized`] with zero
    /// side effects -- no network call, no notification, no spawned
    /// task. The host maps that to its 403-equivalent response.
    ///
    /// Returns the resulting power state for the three plug operations
    /// (`None` when the operation was a guarded or blank-address no-op).
    pub async fn handle(
        &self,
        caller: &dyn Caller,
        cmd: ApiCommand,
    ) -> Result<Option<PowerState>, CoreError> {
        if !caller.has_control_permission() {
            return Err(CoreError::Unauthorized);
        }

        debug!(?cmd, "dispatching API command");
        match cmd {
            ApiCommand::TurnOn { address, idx } => {
                Ok(Some(self.dispatcher.turn_on(&address, &idx).await))
            }
            ApiCommand::TurnOff { address, idx } => {
                Ok(self.dispatcher.turn_off(&address, &idx).await)
            }
            ApiCommand::CheckStatus { address, idx } => {
                Ok(self.dispatcher.check_status(&address, &idx).await)
            }
            ApiCommand::ConnectPrinter => {
                self.dispatcher.connect_printer().await;
                Ok(None)
            }
            ApiCommand::DisconnectPrinter => {
                self.dispatcher.disconnect_printer().await;
                Ok(None)
            }
            ApiCommand::SysCommand { cmd } => {
                self.dispatcher.run_local_command(&cmd).await?;
                Ok(None)
            }
        }
    }
}
