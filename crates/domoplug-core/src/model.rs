// ── Notification model ──

use serde::{Deserialize, Serialize};

use domoplug_api::PowerState;

/// State-change notification emitted after every completed (or failed)
/// control/status operation.
///
/// Broadcast to all listeners; the host typically forwards the JSON form
/// to its UI. Serializes as `{"currentState": ..., "address": ..., "idx": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateNotification {
    pub current_state: PowerState,
    pub address: String,
    pub idx: String,
}
