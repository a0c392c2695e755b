mod cli;
mod commands;
mod error;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use domoplug_core::{NoopPrinter, PowerDispatcher, ShellCommandRunner, TlsMode};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let dispatcher = build_dispatcher(&cli.global)?;

    tracing::debug!(command = ?cli.command, "dispatching command");
    let result = match cli.command {
        Command::On(args) => commands::power::turn_on(&dispatcher, &args, &cli.global).await,
        Command::Off(args) => commands::power::turn_off(&dispatcher, &args, &cli.global).await,
        Command::Status(args) => {
            commands::power::status(&dispatcher, &args, &cli.global).await
        }
        Command::Plugs => {
            commands::plugs::list(&dispatcher);
            Ok(())
        }
        Command::Gcode(args) => commands::gcode::replay(&dispatcher, &args).await,
    };

    // Delayed side effects (on_command/off_command, reconnects) are
    // scheduled fire-and-forget; a one-shot process has to wait for
    // them or they silently never run.
    dispatcher.drain().await;
    result
}

/// Build a `PowerDispatcher` from the config file and CLI overrides.
///
/// The CLI has no printer to manage, so the dispatcher gets the no-op
/// printer host; local commands run through the shell runner.
fn build_dispatcher(global: &cli::GlobalOpts) -> Result<PowerDispatcher, CliError> {
    let config = load_config(global)?;

    let registry = config.registry()?;
    let mut transport = config.transport();
    if global.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(timeout) = global.timeout {
        transport.timeout = std::time::Duration::from_secs(timeout);
    }

    Ok(PowerDispatcher::with_transport(
        registry,
        Arc::new(NoopPrinter),
        Arc::new(ShellCommandRunner),
        transport,
    ))
}

fn load_config(global: &cli::GlobalOpts) -> Result<domoplug_config::Config, CliError> {
    match &global.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::NoConfig {
                    path: path.display().to_string(),
                });
            }
            Ok(domoplug_config::load_config(path)?)
        }
        None => Ok(domoplug_config::load_config_or_default()?),
    }
}

/// The config path shown in diagnostics.
pub(crate) fn shown_config_path(global: &cli::GlobalOpts) -> String {
    global.config.as_ref().map_or_else(
        || domoplug_config::config_path().display().to_string(),
        |p| p.display().to_string(),
    )
}
