//! Bounded per-unit history ring.

use std::collections::VecDeque;

use machmon_core::sample::HistoryEntry;
use machmon_core::types::Timestamp;

/// Retained observations for one unit, capped at a fixed entry count.
///
/// Entries arrive mostly in timestamp order, but late samples are
/// recorded with their own (earlier) timestamps, so queries sort rather
/// than assume insertion order. Retention-window purging is best-effort
/// and driven externally; the entry cap guards against one chatty unit
/// growing without bound between purges.
#[derive(Debug)]
pub struct UnitHistory {
    entries: VecDeque<HistoryEntry>,
    cap: usize,
}

impl UnitHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cap,
        }
    }

    /// Append an entry, evicting the oldest when at capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries recorded at or after `since`, newest first.
    pub fn within(&self, since: Timestamp) -> Vec<HistoryEntry> {
        let mut selected: Vec<HistoryEntry> = self
            .entries
            .iter()
            .filter(|e| e.recorded_at >= since)
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        selected
    }

    /// Drop entries older than `cutoff`. Returns how many were removed.
    pub fn purge_older_than(&mut self, cutoff: Timestamp) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.recorded_at >= cutoff);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
