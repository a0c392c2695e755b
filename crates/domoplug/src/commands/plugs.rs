//! Plug listing.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use domoplug_core::{PlugConfig, PowerDispatcher};

#[derive(Tabled)]
struct PlugRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Idx")]
    idx: String,
    #[tabled(rename = "G-code")]
    gcode: String,
    #[tabled(rename = "Guard")]
    guard: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&PlugConfig> for PlugRow {
    fn from(p: &PlugConfig) -> Self {
        Self {
            label: p.display_name(),
            address: p.address.clone(),
            idx: p.idx.clone(),
            gcode: yes_no(p.gcode_enabled),
            guard: yes_no(p.warn_printing),
            state: p.current_state.to_string(),
        }
    }
}

fn yes_no(v: bool) -> String {
    if v { "yes".into() } else { "no".into() }
}

pub fn list(dispatcher: &PowerDispatcher) {
    let registry = dispatcher.registry();
    if registry.is_empty() {
        println!("no plugs configured");
        return;
    }

    let rows: Vec<PlugRow> = registry.iter().map(PlugRow::from).collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}
