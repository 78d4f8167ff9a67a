//! Ordered severity states for monitored units.

use serde::{Deserialize, Serialize};

/// Health classification of a single unit.
///
/// The variants are declared least-severe first so the derived `Ord`
/// ranks `Disconnected` above everything else. Exactly one state holds
/// per unit at any instant; callers compare severities with `>` / `max`,
/// never with string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// All metrics within bounds and the unit is reporting on time.
    Healthy,
    /// At least one warning bound breached, no error bound breached.
    Warning,
    /// At least one error bound breached.
    Critical,
    /// The feed exists but the unit has not reported within the
    /// liveness window; its metrics are stale and cannot be trusted.
    Unreachable,
    /// No feed link at all: the unit has never reported, or has been
    /// silent beyond the offline window.
    Disconnected,
}

impl Severity {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Healthy => "healthy",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
            Severity::Unreachable => "unreachable",
            Severity::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
