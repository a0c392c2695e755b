//! Command handlers for the `domoplug` CLI.

pub mod gcode;
pub mod plugs;
pub mod power;
