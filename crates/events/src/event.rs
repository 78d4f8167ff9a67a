//! The canonical state-change event.

use machmon_core::metric_names::MSG_TYPE_UNIT_UPDATE;
use machmon_core::sample::MetricSnapshot;
use machmon_core::severity::Severity;
use machmon_core::types::Timestamp;
use serde::{Deserialize, Serialize};

/// A committed state change for one unit.
///
/// Self-contained: a subscriber connected for only part of a unit's
/// lifetime can interpret every event without additional lookups.
/// Serialized with a `"type": "unit_update"` tag on the live boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub unit_id: String,
    pub severity: Severity,
    pub snapshot: MetricSnapshot,
    /// Commit timestamp of the transition.
    pub timestamp: Timestamp,
    /// Cause of the transition, when not a plain sample (e.g.
    /// `"liveness timeout"` from the sweep).
    pub reason: Option<String>,
}

impl StatusEvent {
    /// Serialize as the self-contained live-boundary message.
    pub fn to_message(&self) -> serde_json::Value {
        serde_json::json!({
            "type": MSG_TYPE_UNIT_UPDATE,
            "unit_id": self.unit_id,
            "severity": self.severity,
            "snapshot": self.snapshot,
            "timestamp": self.timestamp,
            "reason": self.reason,
        })
    }
}
