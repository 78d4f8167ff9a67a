//! Feed message types and parser.
//!
//! The feed sends JSON messages over WebSocket with the shape
//! `{"type": "<kind>", ...}`. This module deserializes them into a
//! strongly-typed [`FeedMessage`] enum; anything that does not parse is
//! a malformed sample to be logged and skipped by the processor.

use std::collections::BTreeMap;

use machmon_core::sample::MetricSnapshot;
use machmon_core::types::Timestamp;
use serde::Deserialize;

/// All known feed message types.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum FeedMessage {
    /// A telemetry sample for one unit.
    #[serde(rename = "unit_update")]
    UnitUpdate(UnitUpdateData),

    /// Upstream keepalive; carries no data.
    #[serde(rename = "heartbeat")]
    Heartbeat,
}

/// Payload for `unit_update` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitUpdateData {
    pub unit_id: String,
    /// Metric name -> reading. Absent metrics are absent, not zero.
    #[serde(default)]
    pub data: BTreeMap<String, f64>,
    pub timestamp: Timestamp,
}

impl UnitUpdateData {
    /// Convert the payload into an immutable snapshot.
    pub fn into_snapshot(self) -> (String, MetricSnapshot, Timestamp) {
        let snapshot = MetricSnapshot {
            readings: self.data,
            sampled_at: self.timestamp,
        };
        (self.unit_id, snapshot, self.timestamp)
    }
}

/// Parse a raw text frame into a typed message.
pub fn parse_message(text: &str) -> Result<FeedMessage, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unit_update() {
        let raw = r#"{
            "type": "unit_update",
            "unit_id": "scania_new_sweden",
            "data": {"temperature": 40.7, "pressure": 2.0, "speed": 1500},
            "timestamp": "2026-08-30T12:00:00Z"
        }"#;

        let msg = parse_message(raw).unwrap();
        let FeedMessage::UnitUpdate(update) = msg else {
            panic!("Expected UnitUpdate, got {msg:?}");
        };
        assert_eq!(update.unit_id, "scania_new_sweden");
        assert_eq!(update.data.get("temperature"), Some(&40.7));
        assert_eq!(update.data.len(), 3);
    }

    #[test]
    fn missing_metrics_stay_absent() {
        let raw = r#"{
            "type": "unit_update",
            "unit_id": "dongfeng_china",
            "data": {"temperature": 43.5},
            "timestamp": "2026-08-30T12:00:00Z"
        }"#;

        let FeedMessage::UnitUpdate(update) = parse_message(raw).unwrap() else {
            panic!("Expected UnitUpdate");
        };
        let (_, snapshot, _) = update.into_snapshot();
        assert_eq!(snapshot.reading("temperature"), Some(43.5));
        assert_eq!(snapshot.reading("speed"), None);
    }

    #[test]
    fn parses_heartbeat() {
        let msg = parse_message(r#"{"type": "heartbeat"}"#).unwrap();
        assert!(matches!(msg, FeedMessage::Heartbeat));
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(parse_message(r#"{"type": "mystery"}"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_message("not json at all").is_err());
        assert!(parse_message(r#"{"type": "unit_update", "unit_id": 17}"#).is_err());
    }
}
