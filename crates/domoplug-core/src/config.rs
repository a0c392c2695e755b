// ── Plug configuration and registry ──
//
// These types describe *what* to control. The host (or the config crate)
// builds the registry; the core only reads it and occasionally swaps in a
// snapshot with an updated state cache. Entries are never created or
// destroyed here.

use std::sync::Arc;

use domoplug_api::{PowerState, RelayCredentials};

/// One configured relay.
#[derive(Debug, Clone)]
pub struct PlugConfig {
    /// Base URL/host of the Domoticz controller (scheme optional).
    pub address: String,
    /// Remote device identifier. A string -- Domoticz idx values are
    /// numeric in practice but compared verbatim.
    pub idx: String,
    /// Display name used in log lines.
    pub label: String,
    /// Optional basic-auth and/or passcode material.
    pub credentials: RelayCredentials,
    /// Skip TLS certificate verification for this plug.
    pub ignore_tls: bool,

    /// Reconnect the printer after a successful power-on.
    pub auto_connect: bool,
    pub auto_connect_delay: u64,

    /// Disconnect the printer before sending power-off.
    pub auto_disconnect: bool,
    pub auto_disconnect_delay: u64,

    /// Run a local command after power-on.
    pub sys_cmd_on: bool,
    pub sys_run_cmd_on: String,
    pub sys_cmd_on_delay: u64,

    /// Run a local command around power-off (scheduled, not awaited).
    pub sys_cmd_off: bool,
    pub sys_run_cmd_off: String,
    pub sys_cmd_off_delay: u64,

    /// Allow `M8x` / `@DOMOTICZ*` lines in the G-code stream to drive
    /// this plug.
    pub gcode_enabled: bool,
    pub gcode_on_delay: u64,
    pub gcode_off_delay: u64,

    /// Suppress power-off while a print job is active.
    pub warn_printing: bool,

    /// Last observed state. Advisory display cache only -- every command
    /// round-trips to the device regardless.
    pub current_state: PowerState,
}

impl PlugConfig {
    /// A plug with the stock defaults for the given target.
    pub fn new(address: impl Into<String>, idx: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            idx: idx.into(),
            label: String::new(),
            credentials: RelayCredentials::none(),
            ignore_tls: false,
            auto_connect: true,
            auto_connect_delay: 10,
            auto_disconnect: true,
            auto_disconnect_delay: 0,
            sys_cmd_on: false,
            sys_run_cmd_on: String::new(),
            sys_cmd_on_delay: 0,
            sys_cmd_off: false,
            sys_run_cmd_off: String::new(),
            sys_cmd_off_delay: 0,
            gcode_enabled: false,
            gcode_on_delay: 0,
            gcode_off_delay: 0,
            warn_printing: false,
            current_state: PowerState::Unknown,
        }
    }

    /// Name to use in log lines: the label if set, else `address/idx`.
    pub fn display_name(&self) -> String {
        if self.label.is_empty() {
            format!("{}/{}", self.address, self.idx)
        } else {
            self.label.clone()
        }
    }

    /// `true` if this plug matches the given target. Address comparison
    /// is ASCII case-insensitive; idx is compared verbatim.
    fn matches(&self, address: &str, idx: &str) -> bool {
        self.address.eq_ignore_ascii_case(address) && self.idx == idx
    }
}

/// Immutable snapshot of the configured plug list.
///
/// Lookup is a linear scan and the *first* match wins: ties are not an
/// error, configuration order determines precedence.
#[derive(Debug, Clone, Default)]
pub struct PlugRegistry {
    plugs: Arc<[PlugConfig]>,
}

impl PlugRegistry {
    pub fn new(plugs: Vec<PlugConfig>) -> Self {
        Self {
            plugs: plugs.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plugs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugs.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlugConfig> {
        self.plugs.iter()
    }

    /// First plug matching `(address, idx)`. Address matching is
    /// case-insensitive for every caller, API and G-code paths alike.
    pub fn find(&self, address: &str, idx: &str) -> Option<&PlugConfig> {
        self.plugs.iter().find(|p| p.matches(address, idx))
    }

    /// First G-code-enabled plug matching `(address, idx)`.
    pub fn find_gcode_enabled(&self, address: &str, idx: &str) -> Option<&PlugConfig> {
        self.plugs
            .iter()
            .find(|p| p.gcode_enabled && p.matches(address, idx))
    }

    /// First G-code-enabled plug with the given idx, any address.
    /// Used by the `@DOMOTICZ*` comment-directive family, which carries
    /// no address token.
    pub fn find_by_idx_enabled(&self, idx: &str) -> Option<&PlugConfig> {
        self.plugs
            .iter()
            .find(|p| p.gcode_enabled && p.idx == idx)
    }

    /// A new snapshot with the matching plug's state cache updated.
    /// Returns an unchanged clone when no plug matches.
    pub fn with_state(&self, address: &str, idx: &str, state: PowerState) -> Self {
        let mut plugs: Vec<PlugConfig> = self.plugs.to_vec();
        if let Some(plug) = plugs.iter_mut().find(|p| p.matches(address, idx)) {
            plug.current_state = state;
        }
        Self::new(plugs)
    }
}

impl FromIterator<PlugConfig> for PlugRegistry {
    fn from_iter<I: IntoIterator<Item = PlugConfig>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PlugRegistry {
    type Item = &'a PlugConfig;
    type IntoIter = std::slice::Iter<'a, PlugConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.plugs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PlugRegistry {
        let mut a = PlugConfig::new("10.0.0.5", "2");
        a.label = "first".into();
        a.gcode_enabled = true;
        let mut b = PlugConfig::new("10.0.0.5", "3");
        b.label = "second".into();
        let mut c = PlugConfig::new("10.0.0.5", "2");
        c.label = "shadowed".into();
        c.gcode_enabled = true;
        PlugRegistry::new(vec![a, b, c])
    }

    #[test]
    fn find_returns_exact_entry() {
        let reg = registry();
        assert_eq!(reg.find("10.0.0.5", "3").unwrap().label, "second");
    }

    #[test]
    fn find_absent_is_none() {
        let reg = registry();
        assert!(reg.find("10.0.0.5", "9").is_none());
        assert!(reg.find("10.0.0.99", "2").is_none());
    }

    #[test]
    fn find_first_match_wins() {
        let reg = registry();
        // Two entries share (address, idx); configuration order decides.
        assert_eq!(reg.find("10.0.0.5", "2").unwrap().label, "first");
    }

    #[test]
    fn find_address_is_case_insensitive() {
        let mut plug = PlugConfig::new("Domoticz.LOCAL", "1");
        plug.gcode_enabled = true;
        let reg = PlugRegistry::new(vec![plug]);
        assert!(reg.find("domoticz.local", "1").is_some());
        assert!(reg.find_gcode_enabled("DOMOTICZ.local", "1").is_some());
    }

    #[test]
    fn idx_is_case_sensitive_verbatim() {
        let reg = PlugRegistry::new(vec![PlugConfig::new("h", "2a")]);
        assert!(reg.find("h", "2a").is_some());
        assert!(reg.find("h", "2A").is_none());
    }

    #[test]
    fn find_by_idx_skips_disabled() {
        let reg = registry();
        // idx 3 exists but is not gcode-enabled.
        assert!(reg.find_by_idx_enabled("3").is_none());
        assert_eq!(reg.find_by_idx_enabled("2").unwrap().label, "first");
    }

    #[test]
    fn with_state_updates_first_match_only() {
        let reg = registry();
        let updated = reg.with_state("10.0.0.5", "2", PowerState::On);
        let states: Vec<PowerState> =
            updated.iter().map(|p| p.current_state).collect();
        assert_eq!(
            states,
            vec![PowerState::On, PowerState::Unknown, PowerState::Unknown]
        );
        // Original snapshot untouched.
        assert_eq!(
            reg.find("10.0.0.5", "2").unwrap().current_state,
            PowerState::Unknown
        );
    }
}
