//! Clap derive structures for the `domoplug` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// domoplug -- control Domoticz smart plugs around print jobs
#[derive(Debug, Parser)]
#[command(
    name = "domoplug",
    version,
    about = "Toggle Domoticz smart plugs from the command line",
    long_about = "Switch Domoticz-controlled relays on and off, query their state,\n\
        and replay the M80/M81 and @DOMOTICZ G-code triggers from a file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(long, env = "DOMOPLUG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Accept self-signed TLS certificates for every plug
    #[arg(long, short = 'k', env = "DOMOPLUG_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "DOMOPLUG_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Turn a plug on
    On(TargetArgs),

    /// Turn a plug off
    Off(TargetArgs),

    /// Query a plug's current state
    Status(TargetArgs),

    /// List configured plugs
    Plugs,

    /// Replay power triggers from a G-code file
    Gcode(GcodeArgs),
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Controller address (as configured)
    pub address: String,

    /// Device idx
    pub idx: String,
}

#[derive(Debug, Args)]
pub struct GcodeArgs {
    /// G-code file to scan
    pub file: PathBuf,

    /// Report recognized triggers without dispatching anything
    #[arg(long)]
    pub dry_run: bool,
}
