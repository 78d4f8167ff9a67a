//! The authoritative unit state store.
//!
//! One record per unit id, each guarded by its own mutex so mutations of
//! a unit are serialized while unrelated units proceed concurrently.
//! Every commit path (ingest sample, feed sample, liveness sweep) goes
//! through the same classify-and-commit discipline, and a commit that
//! changes the reported severity or metric content pushes exactly one
//! event to the hub.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use machmon_core::classifier::classify;
use machmon_core::error::CoreError;
use machmon_core::sample::{HistoryEntry, MetricSnapshot, UnitMetadata};
use machmon_core::severity::Severity;
use machmon_core::thresholds::{ThresholdSet, ThresholdUpdate};
use machmon_core::types::Timestamp;
use machmon_events::{EventHub, StatusEvent};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::history::UnitHistory;
use crate::thresholds::ThresholdHandle;

/// Default per-unit history entry cap.
const DEFAULT_HISTORY_CAP: usize = 1000;

/// Reason string recorded when the liveness sweep degrades a unit.
pub const REASON_LIVENESS_TIMEOUT: &str = "liveness timeout";

/// Reason string recorded for out-of-order samples kept in history.
pub const REASON_LATE_SAMPLE: &str = "late sample";

/// A consistent point-in-time view of one unit, as returned on the
/// query boundary. Never partially updated: it is cloned out from under
/// the unit's mutex.
#[derive(Debug, Clone, Serialize)]
pub struct UnitState {
    pub id: String,
    pub metadata: UnitMetadata,
    pub severity: Severity,
    pub last_seen: Option<Timestamp>,
    pub snapshot: MetricSnapshot,
    /// When the severity last changed.
    pub state_changed_at: Timestamp,
}

/// Internal mutable record for one unit.
struct UnitRecord {
    metadata: UnitMetadata,
    severity: Severity,
    last_seen: Option<Timestamp>,
    snapshot: MetricSnapshot,
    state_changed_at: Timestamp,
    history: UnitHistory,
    /// Severity + readings of the last event pushed to the hub, used to
    /// suppress duplicate no-op events. Compared on metric content, not
    /// sample timestamps: a re-sent identical reading is a no-op.
    last_emitted: Option<(Severity, std::collections::BTreeMap<String, f64>)>,
}

impl UnitRecord {
    fn view(&self, id: &str) -> UnitState {
        UnitState {
            id: id.to_string(),
            metadata: self.metadata.clone(),
            severity: self.severity,
            last_seen: self.last_seen,
            snapshot: self.snapshot.clone(),
            state_changed_at: self.state_changed_at,
        }
    }
}

/// Single source of truth for all units' current state and history.
///
/// Thread-safe; designed to be wrapped in `Arc` and shared across the
/// ingest transport, the feed client, and the background sweep.
pub struct UnitStore {
    units: RwLock<HashMap<String, Arc<Mutex<UnitRecord>>>>,
    thresholds: ThresholdHandle,
    hub: Arc<EventHub>,
    history_cap: usize,
}

impl UnitStore {
    pub fn new(thresholds: ThresholdSet, hub: Arc<EventHub>) -> Self {
        Self {
            units: RwLock::new(HashMap::new()),
            thresholds: ThresholdHandle::new(thresholds),
            hub,
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }

    /// Register a unit, or update an existing unit's static metadata.
    ///
    /// Idempotent: re-registering never resets severity, `last_seen`, or
    /// history. New units start `Disconnected` until their first sample.
    pub async fn register_unit(&self, id: &str, metadata: UnitMetadata) {
        let mut units = self.units.write().await;
        match units.get(id) {
            Some(record) => {
                record.lock().await.metadata = metadata;
                tracing::debug!(unit_id = %id, "Unit metadata updated");
            }
            None => {
                let now = Utc::now();
                units.insert(
                    id.to_string(),
                    Arc::new(Mutex::new(UnitRecord {
                        metadata,
                        severity: Severity::Disconnected,
                        last_seen: None,
                        snapshot: MetricSnapshot::empty(now),
                        state_changed_at: now,
                        history: UnitHistory::new(self.history_cap),
                        last_emitted: None,
                    })),
                );
                tracing::info!(unit_id = %id, "Unit registered");
            }
        }
    }

    /// Classify a sample and attempt to commit it.
    ///
    /// Returns whether the visible severity changed. Samples timestamped
    /// before the unit's committed `last_seen` never regress the
    /// authoritative state, but are still appended to history (reason
    /// `"late sample"`) so delayed telemetry stays auditable.
    pub async fn apply_sample(
        &self,
        id: &str,
        snapshot: MetricSnapshot,
        timestamp: Timestamp,
    ) -> Result<bool, CoreError> {
        let record = self.lookup(id).await?;
        let thresholds = self.thresholds.load().await;
        let mut record = record.lock().await;

        if let Some(last_seen) = record.last_seen {
            if timestamp < last_seen {
                tracing::debug!(
                    unit_id = %id,
                    sample_ts = %timestamp,
                    committed_ts = %last_seen,
                    "Out-of-order sample, recording to history only",
                );
                let severity = record.severity;
                record.history.push(HistoryEntry {
                    unit_id: id.to_string(),
                    severity,
                    snapshot,
                    recorded_at: timestamp,
                    reason: Some(REASON_LATE_SAMPLE.to_string()),
                });
                return Ok(false);
            }
        }

        let severity = classify(Utc::now(), Some(timestamp), &snapshot, &thresholds);
        let changed = self
            .commit(id, &mut record, severity, snapshot, timestamp, None)
            .await;
        Ok(changed)
    }

    /// Re-evaluate every unit purely from elapsed time since `last_seen`.
    ///
    /// A unit that stopped reporting degrades to `Unreachable` or
    /// `Disconnected` without waiting for a sample that will never
    /// arrive. Transitions commit through the same path as samples, so
    /// they also produce a history entry (reason `"liveness timeout"`)
    /// and a broadcast event. Returns the number of units that changed.
    pub async fn sweep(&self, now: Timestamp) -> usize {
        let units: Vec<(String, Arc<Mutex<UnitRecord>>)> = {
            let map = self.units.read().await;
            map.iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect()
        };
        let thresholds = self.thresholds.load().await;

        let mut transitions = 0;
        for (id, record) in units {
            let mut record = record.lock().await;
            let severity = classify(now, record.last_seen, &record.snapshot, &thresholds);
            if severity == record.severity {
                continue;
            }
            tracing::info!(
                unit_id = %id,
                from = %record.severity,
                to = %severity,
                "Liveness sweep state transition",
            );
            let snapshot = record.snapshot.clone();
            self.commit(
                &id,
                &mut record,
                severity,
                snapshot,
                now,
                Some(REASON_LIVENESS_TIMEOUT.to_string()),
            )
            .await;
            transitions += 1;
        }
        transitions
    }

    /// Current state of one unit, or `None` if never registered.
    pub async fn get(&self, id: &str) -> Option<UnitState> {
        let record = self.lookup(id).await.ok()?;
        let record = record.lock().await;
        Some(record.view(id))
    }

    /// Current state of every registered unit, ordered by id.
    pub async fn list_all(&self) -> Vec<UnitState> {
        let units: Vec<(String, Arc<Mutex<UnitRecord>>)> = {
            let map = self.units.read().await;
            map.iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect()
        };

        let mut states = Vec::with_capacity(units.len());
        for (id, record) in units {
            let record = record.lock().await;
            states.push(record.view(&id));
        }
        states.sort_by(|a, b| a.id.cmp(&b.id));
        states
    }

    /// History entries for a unit within `window` of now, newest first.
    /// An unknown unit yields an empty sequence, not an error.
    pub async fn history(&self, id: &str, window: chrono::Duration) -> Vec<HistoryEntry> {
        match self.lookup(id).await {
            Ok(record) => {
                let record = record.lock().await;
                record.history.within(Utc::now() - window)
            }
            Err(_) => Vec::new(),
        }
    }

    /// Best-effort retention enforcement: drop history entries older
    /// than `cutoff` across all units. Returns how many were removed.
    pub async fn purge_history(&self, cutoff: Timestamp) -> usize {
        let units: Vec<Arc<Mutex<UnitRecord>>> = {
            let map = self.units.read().await;
            map.values().map(Arc::clone).collect()
        };

        let mut removed = 0;
        for record in units {
            removed += record.lock().await.history.purge_older_than(cutoff);
        }
        removed
    }

    /// The threshold set currently in effect.
    pub async fn thresholds(&self) -> Arc<ThresholdSet> {
        self.thresholds.load().await
    }

    /// Apply a partial threshold update. Invalid bounds are rejected
    /// synchronously and the prior set stays in effect.
    pub async fn update_thresholds(
        &self,
        update: &ThresholdUpdate,
    ) -> Result<ThresholdSet, CoreError> {
        self.thresholds.apply(update, Utc::now()).await
    }

    /// Number of registered units.
    pub async fn unit_count(&self) -> usize {
        self.units.read().await.len()
    }

    // ---- private helpers ----

    async fn lookup(&self, id: &str) -> Result<Arc<Mutex<UnitRecord>>, CoreError> {
        self.units
            .read()
            .await
            .get(id)
            .map(Arc::clone)
            .ok_or_else(|| CoreError::NotFound {
                entity: "unit",
                id: id.to_string(),
            })
    }

    /// Commit a classified observation under the unit's lock.
    ///
    /// Appends a history entry, advances `last_seen` for sample commits,
    /// and pushes an event to the hub iff the (severity, snapshot) pair
    /// differs from the last emitted one. Returns whether the visible
    /// severity changed.
    async fn commit(
        &self,
        id: &str,
        record: &mut UnitRecord,
        severity: Severity,
        snapshot: MetricSnapshot,
        timestamp: Timestamp,
        reason: Option<String>,
    ) -> bool {
        let severity_changed = severity != record.severity;

        // Sweep commits carry no new sample; only sample commits move
        // last_seen forward.
        if reason.as_deref() != Some(REASON_LIVENESS_TIMEOUT) {
            record.last_seen = Some(timestamp);
        }
        record.snapshot = snapshot.clone();
        if severity_changed {
            record.severity = severity;
            record.state_changed_at = timestamp;
        }

        record.history.push(HistoryEntry {
            unit_id: id.to_string(),
            severity,
            snapshot: snapshot.clone(),
            recorded_at: timestamp,
            reason: reason.clone(),
        });

        let emit = record.last_emitted.as_ref() != Some(&(severity, snapshot.readings.clone()));
        if emit {
            record.last_emitted = Some((severity, snapshot.readings.clone()));
            self.hub
                .publish(StatusEvent {
                    unit_id: id.to_string(),
                    severity,
                    snapshot,
                    timestamp,
                    reason,
                })
                .await;
        }

        severity_changed
    }
}
