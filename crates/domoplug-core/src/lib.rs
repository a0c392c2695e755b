//! Power control logic between `domoplug-api` and plugin-host consumers.
//!
//! This crate owns the business logic for toggling Domoticz smart plugs
//! around print jobs:
//!
//! - **[`PlugRegistry`]** — Immutable snapshot of configured plugs with
//!   first-match-wins lookup by `(address, idx)`. State-cache updates swap
//!   in a fresh snapshot instead of mutating shared entries.
//!
//! - **[`PowerDispatcher`]** — Central facade. Resolves a plug, performs
//!   the HTTP round trip via [`domoplug_api::RelayClient`], emits a
//!   [`StateNotification`] on a broadcast channel, and schedules the
//!   fire-and-forget side effects (printer reconnect, local commands,
//!   delayed G-code triggers).
//!
//! - **G-code triggers** ([`gcode`]) — Parses `M80`/`M81` command lines
//!   and `@DOMOTICZON`/`@DOMOTICZOFF` comment directives into scheduled
//!   dispatcher calls.
//!
//! - **Host collaborators** ([`host`]) — [`PrinterHost`] and
//!   [`CommandRunner`] traits injected by the embedding host. Local
//!   command execution is an explicit capability, never an ambient call.
//!
//! - **[`CommandGate`]** — Authorization boundary for the host's API
//!   surface; unauthorized callers are rejected before any side effect.

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gcode;
pub mod host;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{ApiCommand, Caller, CommandGate};
pub use config::{PlugConfig, PlugRegistry};
pub use dispatcher::PowerDispatcher;
pub use error::CoreError;
pub use gcode::{PowerAction, Trigger, TriggerTarget, parse_trigger};
pub use host::{CommandRunner, NoopPrinter, PrinterHost, ShellCommandRunner};
pub use model::StateNotification;

// Re-export the wire-level vocabulary: the state enum every
// notification carries, plus the credential/transport types consumers
// need to build a registry.
pub use domoplug_api::{
    BasicCredentials, PowerState, RelayCredentials, TlsMode, TransportConfig,
};
