// ── G-code trigger parsing ──
//
// Two textual trigger families drive plugs from the print stream:
//
//   M80 <address> <idx>   -- power on    (command lines)
//   M81 <address> <idx>   -- power off
//   @DOMOTICZON <idx>     -- power on    (comment-directive lines)
//   @DOMOTICZOFF <idx>
//
// Parsing is pure; matching and scheduling live on the dispatcher.
// Only gcode-enabled plugs participate, and only the first matching
// plug in registry order fires.

use std::time::Duration;

use tracing::debug;

use crate::dispatcher::PowerDispatcher;

/// What a trigger asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    On,
    Off,
}

/// How a trigger names its plug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerTarget {
    /// Numeric family: address and idx both given on the line.
    ByAddress { address: String, idx: String },
    /// Comment-directive family: idx only, first enabled plug wins.
    ByIdx { idx: String },
}

/// A recognized power trigger from one G-code line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub action: PowerAction,
    pub target: TriggerTarget,
}

/// Parse one line of the stream into a trigger, if any.
///
/// `is_command` is the host's flag for whether the line is a real
/// G-code command (as opposed to a comment/no-op line). The `M8x`
/// family only matches command lines; `@DOMOTICZ*` only matches
/// non-command lines.
///
/// Unrecognized sub-forms (`M82 ...`, `@DOMOTICZFOO ...`) return `None`:
/// they are silently ignored, not errors.
pub fn parse_trigger(line: &str, is_command: bool) -> Option<Trigger> {
    if is_command {
        if !line.starts_with("M8") {
            return None;
        }
        let mut tokens = line.split_whitespace();
        let head = tokens.next()?;
        let address = tokens.next()?;
        let idx = tokens.next()?;

        let action = if head.starts_with("M80") {
            PowerAction::On
        } else if head.starts_with("M81") {
            PowerAction::Off
        } else {
            return None;
        };

        Some(Trigger {
            action,
            target: TriggerTarget::ByAddress {
                address: address.to_string(),
                idx: idx.to_string(),
            },
        })
    } else {
        if !line.starts_with("@DOMOTICZ") {
            return None;
        }
        let mut tokens = line.split_whitespace();
        let head = tokens.next()?;
        let idx = tokens.next()?;
        // Exactly one trailing token.
        if tokens.next().is_some() {
            return None;
        }

        let action = if head.starts_with("@DOMOTICZON") {
            PowerAction::On
        } else if head.starts_with("@DOMOTICZOFF") {
            PowerAction::Off
        } else {
            return None;
        };

        Some(Trigger {
            action,
            target: TriggerTarget::ByIdx {
                idx: idx.to_string(),
            },
        })
    }
}

impl PowerDispatcher {
    /// Feed one line of the G-code stream through the trigger matcher.
    ///
    /// A recognized trigger against the first gcode-enabled matching
    /// plug schedules a power-on after `gcode_on_delay` or a power-off
    /// after `gcode_off_delay`. The power-off path re-evaluates the
    /// printing guard when it fires, not when it is scheduled.
    pub fn process_gcode_line(&self, line: &str, is_command: bool) {
        let Some(trigger) = parse_trigger(line, is_command) else {
            return;
        };

        let registry = self.registry();
        let plug = match &trigger.target {
            TriggerTarget::ByAddress { address, idx } => {
                registry.find_gcode_enabled(address, idx)
            }
            TriggerTarget::ByIdx { idx } => registry.find_by_idx_enabled(idx),
        };
        // First enabled match only; no match, no trigger.
        let Some(plug) = plug else { return };

        let address = plug.address.clone();
        let idx = plug.idx.clone();

        match trigger.action {
            PowerAction::On => {
                debug!(address, idx, delay = plug.gcode_on_delay, "gcode trigger: power on");
                let dispatcher = self.clone();
                self.schedule(Duration::from_secs(plug.gcode_on_delay), async move {
                    dispatcher.turn_on(&address, &idx).await;
                });
            }
            PowerAction::Off => {
                debug!(address, idx, delay = plug.gcode_off_delay, "gcode trigger: power off");
                let dispatcher = self.clone();
                self.schedule(Duration::from_secs(plug.gcode_off_delay), async move {
                    dispatcher.turn_off(&address, &idx).await;
                });
            }
        }
    }
}
