//! Sample and unit record types shared across the workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::severity::Severity;
use crate::types::Timestamp;

/// An immutable set of named numeric readings taken at one instant.
///
/// A new sample always produces a new snapshot; readings are never
/// mutated in place. A metric absent from `readings` is absent, not
/// zero -- the classifier must never manufacture a reading for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Metric name -> numeric reading (see [`crate::metric_names`]).
    pub readings: BTreeMap<String, f64>,
    /// When the readings were taken (UTC).
    pub sampled_at: Timestamp,
}

impl MetricSnapshot {
    /// Build a snapshot from an iterator of `(name, value)` pairs.
    pub fn new<I, S>(readings: I, sampled_at: Timestamp) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            readings: readings.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            sampled_at,
        }
    }

    /// An empty snapshot, used for units that have registered but never
    /// reported.
    pub fn empty(sampled_at: Timestamp) -> Self {
        Self {
            readings: BTreeMap::new(),
            sampled_at,
        }
    }

    /// Look up a single reading by canonical metric name.
    pub fn reading(&self, metric: &str) -> Option<f64> {
        self.readings.get(metric).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Static descriptive metadata for a unit.
///
/// Set at registration and only ever replaced wholesale by a
/// re-registration; never derived from telemetry and never reclassified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMetadata {
    /// Human-readable display name.
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Free-form location label (typically a country or site name).
    pub location: String,
    /// Product line of the installed system, if known.
    pub system_type: Option<String>,
}

/// One retained observation in a unit's bounded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub unit_id: String,
    pub severity: Severity,
    pub snapshot: MetricSnapshot,
    /// When the entry was recorded (the sample's own timestamp, which
    /// for late-arriving samples may predate newer entries).
    pub recorded_at: Timestamp,
    /// Human-readable cause, e.g. `"liveness timeout"` for sweep
    /// transitions or `"late sample"` for out-of-order arrivals.
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn missing_reading_is_absent_not_zero() {
        let snap = MetricSnapshot::new([("temperature", 42.0)], Utc::now());
        assert_eq!(snap.reading("temperature"), Some(42.0));
        assert_eq!(snap.reading("pressure"), None);
    }

    #[test]
    fn empty_snapshot_has_no_readings() {
        let snap = MetricSnapshot::empty(Utc::now());
        assert!(snap.is_empty());
        assert_eq!(snap.reading("speed"), None);
    }
}
