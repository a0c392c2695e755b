//! Replay power triggers from a G-code file.

use std::time::Duration;

use domoplug_core::{PowerAction, PowerDispatcher, TriggerTarget, parse_trigger};

use crate::cli::GcodeArgs;
use crate::error::CliError;

pub async fn replay(dispatcher: &PowerDispatcher, args: &GcodeArgs) -> Result<(), CliError> {
    let content = std::fs::read_to_string(&args.file).map_err(|source| CliError::Io {
        path: args.file.display().to_string(),
        source,
    })?;

    let registry = dispatcher.registry();
    let mut rx = dispatcher.subscribe();
    let mut dispatched = 0usize;
    let mut max_delay = 0u64;

    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        // The host's stream carries an is-command flag per line; for a
        // file, comment and @-directive lines are the non-commands.
        let is_command = !(line.starts_with(';') || line.starts_with('@'));
        let Some(trigger) = parse_trigger(line, is_command) else {
            continue;
        };

        let plug = match &trigger.target {
            TriggerTarget::ByAddress { address, idx } => {
                registry.find_gcode_enabled(address, idx)
            }
            TriggerTarget::ByIdx { idx } => registry.find_by_idx_enabled(idx),
        };
        let Some(plug) = plug else {
            println!(
                "line {}: trigger for unconfigured or disabled plug, ignored",
                lineno + 1
            );
            continue;
        };

        let (verb, delay) = match trigger.action {
            PowerAction::On => ("power on", plug.gcode_on_delay),
            PowerAction::Off => ("power off", plug.gcode_off_delay),
        };
        println!(
            "line {}: {verb} {} idx {} after {delay}s",
            lineno + 1,
            plug.address,
            plug.idx
        );

        if !args.dry_run {
            dispatcher.process_gcode_line(line, is_command);
            dispatched += 1;
            max_delay = max_delay.max(delay);
        }
    }

    if args.dry_run || dispatched == 0 {
        return Ok(());
    }

    // Each dispatched trigger ends in one state notification. Guarded
    // power-offs would emit nothing, but the CLI's printer is never
    // printing.
    let deadline = Duration::from_secs(max_delay + 15);
    for _ in 0..dispatched {
        match tokio::time::timeout(deadline, rx.recv()).await {
            Ok(Ok(note)) => {
                println!("{} idx {} -> {}", note.address, note.idx, note.current_state);
            }
            _ => {
                println!("timed out waiting for trigger result");
                break;
            }
        }
    }
    Ok(())
}
