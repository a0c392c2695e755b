// Wire models for the Domoticz JSON API.
//
// The API is a GET-based control surface: switch commands answer with a
// top-level `status` field, device queries with a `result` array whose
// entries carry a capitalized `Status` string.

use serde::{Deserialize, Serialize};

/// Observed power state of a relay.
///
/// `Unknown` is the catch-all for every failure mode: network errors,
/// malformed bodies, and device status strings we don't recognize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
    #[default]
    Unknown,
}

impl PowerState {
    /// Map a Domoticz device `Status` string to a power state.
    ///
    /// Dimmers and selector switches report things like `"Set Level: 40%"`;
    /// anything that isn't exactly `On`/`Off` maps to `Unknown`.
    pub fn from_device_status(status: &str) -> Self {
        match status {
            "On" => Self::On,
            "Off" => Self::Off,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Response to a `param=switchlight` command.
///
/// Success is signaled solely by `status == "OK"`.
#[derive(Debug, Deserialize)]
pub struct SwitchResponse {
    pub status: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Response to a device status query (`param=getdevices` / `type=devices`).
#[derive(Debug, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Vec<DeviceEntry>,
}

/// One device record from a status query. Domoticz capitalizes these
/// field names on the wire.
#[derive(Debug, Deserialize)]
pub struct DeviceEntry {
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub idx: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_status_mapping() {
        assert_eq!(PowerState::from_device_status("On"), PowerState::On);
        assert_eq!(PowerState::from_device_status("Off"), PowerState::Off);
        assert_eq!(
            PowerState::from_device_status("Set Level: 40%"),
            PowerState::Unknown
        );
        // Exact match only -- lowercase is not a device status.
        assert_eq!(PowerState::from_device_status("on"), PowerState::Unknown);
    }

    #[test]
    fn power_state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PowerState::On).unwrap(), "\"on\"");
        assert_eq!(
            serde_json::to_string(&PowerState::Unknown).unwrap(),
            "\"unknown\""
        );
    }
}
