//! Power command handlers: on / off / status.

use owo_colors::OwoColorize;

use domoplug_core::{PowerDispatcher, PowerState};

use crate::cli::{GlobalOpts, TargetArgs};
use crate::error::CliError;
use crate::shown_config_path;

pub async fn turn_on(
    dispatcher: &PowerDispatcher,
    args: &TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    require_plug(dispatcher, args, global)?;
    let state = dispatcher.turn_on(&args.address, &args.idx).await;
    report(args, state)
}

pub async fn turn_off(
    dispatcher: &PowerDispatcher,
    args: &TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    require_plug(dispatcher, args, global)?;
    match dispatcher.turn_off(&args.address, &args.idx).await {
        Some(state) => report(args, state),
        None => {
            // Printing guard; unreachable with the no-op printer but the
            // dispatcher contract allows it.
            println!("skipped: print in progress");
            Ok(())
        }
    }
}

pub async fn status(
    dispatcher: &PowerDispatcher,
    args: &TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    require_plug(dispatcher, args, global)?;
    match dispatcher.check_status(&args.address, &args.idx).await {
        Some(state) => report(args, state),
        None => Ok(()),
    }
}

/// Resolve the plug up front so a typo'd target is a crisp not-found
/// error instead of a soft unknown-state round trip.
fn require_plug(
    dispatcher: &PowerDispatcher,
    args: &TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if dispatcher.registry().find(&args.address, &args.idx).is_none() {
        return Err(CliError::PlugNotFound {
            address: args.address.clone(),
            idx: args.idx.clone(),
            config_path: shown_config_path(global),
        });
    }
    Ok(())
}

fn report(args: &TargetArgs, state: PowerState) -> Result<(), CliError> {
    match state {
        PowerState::On => {
            println!("{} idx {} is {}", args.address, args.idx, "on".green());
            Ok(())
        }
        PowerState::Off => {
            println!("{} idx {} is {}", args.address, args.idx, "off".red());
            Ok(())
        }
        PowerState::Unknown => Err(CliError::UnknownState {
            address: args.address.clone(),
            idx: args.idx.clone(),
        }),
    }
}
