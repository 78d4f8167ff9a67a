//! Configurable warning/error bounds per metric.
//!
//! A [`ThresholdSet`] is an immutable value: runtime reconfiguration
//! builds a new set via [`ThresholdSet::apply_update`] and swaps the
//! whole thing atomically, so a classification in progress always sees
//! one complete generation, never a partial update.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metric_names::{METRIC_DISK_VOLUME, METRIC_PRESSURE, METRIC_SPEED, METRIC_TEMPERATURE};
use crate::types::Timestamp;

/// Warning and error bounds for a single metric.
///
/// Metrics bounded above only (temperature, pressure, storage) leave the
/// `*_low` fields unset; metrics where too-low is as bad as too-high
/// (rotational speed) set both sides. A reading exactly equal to a bound
/// is NOT a breach -- all comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricThreshold {
    pub warning_low: Option<f64>,
    pub warning_high: Option<f64>,
    pub error_low: Option<f64>,
    pub error_high: Option<f64>,
}

impl MetricThreshold {
    /// Upper-bound-only threshold (e.g. temperature).
    pub fn upper(warning_high: f64, error_high: f64) -> Self {
        Self {
            warning_low: None,
            warning_high: Some(warning_high),
            error_low: None,
            error_high: Some(error_high),
        }
    }

    /// Two-sided threshold (e.g. rotational speed).
    pub fn band(
        warning_low: f64,
        warning_high: f64,
        error_low: f64,
        error_high: f64,
    ) -> Self {
        Self {
            warning_low: Some(warning_low),
            warning_high: Some(warning_high),
            error_low: Some(error_low),
            error_high: Some(error_high),
        }
    }

    /// Whether `value` breaches an error bound (strict inequality).
    pub fn breaches_error(&self, value: f64) -> bool {
        Self::breaches(value, self.error_low, self.error_high)
    }

    /// Whether `value` breaches a warning bound (strict inequality).
    pub fn breaches_warning(&self, value: f64) -> bool {
        Self::breaches(value, self.warning_low, self.warning_high)
    }

    fn breaches(value: f64, low: Option<f64>, high: Option<f64>) -> bool {
        if let Some(low) = low {
            if value < low {
                return true;
            }
        }
        if let Some(high) = high {
            if value > high {
                return true;
            }
        }
        false
    }

    /// Reject bound combinations that can never classify sensibly.
    ///
    /// A warning bound more severe than its error bound would make
    /// `Critical` unreachable for that side; a low bound above its high
    /// bound would flag every reading.
    fn validate(&self, metric: &str) -> Result<(), CoreError> {
        if self.warning_low.is_none()
            && self.warning_high.is_none()
            && self.error_low.is_none()
            && self.error_high.is_none()
        {
            return Err(CoreError::Validation(format!(
                "threshold for {metric} must define at least one bound"
            )));
        }
        if let (Some(wh), Some(eh)) = (self.warning_high, self.error_high) {
            if wh > eh {
                return Err(CoreError::Validation(format!(
                    "{metric}: warning_high {wh} exceeds error_high {eh}"
                )));
            }
        }
        if let (Some(wl), Some(el)) = (self.warning_low, self.error_low) {
            if wl < el {
                return Err(CoreError::Validation(format!(
                    "{metric}: warning_low {wl} is below error_low {el}"
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (self.warning_low, self.warning_high) {
            if lo >= hi {
                return Err(CoreError::Validation(format!(
                    "{metric}: warning_low {lo} must be below warning_high {hi}"
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (self.error_low, self.error_high) {
            if lo >= hi {
                return Err(CoreError::Validation(format!(
                    "{metric}: error_low {lo} must be below error_high {hi}"
                )));
            }
        }
        Ok(())
    }
}

/// Silence windows that drive the connectivity states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPolicy {
    /// Maximum silence before a unit is considered unreachable.
    pub liveness_window_secs: u64,
    /// Maximum silence before the feed link itself is considered gone.
    pub offline_window_secs: u64,
}

impl ConnectionPolicy {
    pub fn liveness_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.liveness_window_secs as i64)
    }

    pub fn offline_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.offline_window_secs as i64)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.liveness_window_secs == 0 {
            return Err(CoreError::Validation(
                "liveness_window_secs must be positive".into(),
            ));
        }
        if self.offline_window_secs < self.liveness_window_secs {
            return Err(CoreError::Validation(format!(
                "offline_window_secs {} is shorter than liveness_window_secs {}",
                self.offline_window_secs, self.liveness_window_secs
            )));
        }
        Ok(())
    }
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            liveness_window_secs: 5 * 60,
            offline_window_secs: 30 * 60,
        }
    }
}

/// The complete, versioned threshold configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Metric name -> bounds.
    pub metrics: BTreeMap<String, MetricThreshold>,
    pub connection: ConnectionPolicy,
    /// Monotonic version counter, bumped on every accepted update, so a
    /// classification decision can be attributed to the set in effect.
    pub generation: u64,
    pub updated_at: Timestamp,
}

impl ThresholdSet {
    /// Factory defaults for the standard metric vocabulary.
    pub fn standard(now: Timestamp) -> Self {
        let mut metrics = BTreeMap::new();
        metrics.insert(METRIC_TEMPERATURE.to_string(), MetricThreshold::upper(60.0, 80.0));
        metrics.insert(METRIC_PRESSURE.to_string(), MetricThreshold::upper(3.0, 5.0));
        metrics.insert(METRIC_DISK_VOLUME.to_string(), MetricThreshold::upper(85.0, 95.0));
        metrics.insert(
            METRIC_SPEED.to_string(),
            MetricThreshold::band(500.0, 2000.0, 200.0, 2500.0),
        );
        Self {
            metrics,
            connection: ConnectionPolicy::default(),
            generation: 0,
            updated_at: now,
        }
    }

    /// Bounds for a metric, if configured. Unconfigured metrics are
    /// ignored by the classifier.
    pub fn metric(&self, name: &str) -> Option<&MetricThreshold> {
        self.metrics.get(name)
    }

    /// Merge a partial update into this set, producing the next
    /// generation.
    ///
    /// The update is validated in full before anything is merged: on any
    /// invalid bound the error is returned and `self` remains the set in
    /// effect.
    pub fn apply_update(
        &self,
        update: &ThresholdUpdate,
        now: Timestamp,
    ) -> Result<ThresholdSet, CoreError> {
        for (metric, threshold) in &update.metrics {
            threshold.validate(metric)?;
        }
        if let Some(connection) = &update.connection {
            connection.validate()?;
        }

        let mut next = self.clone();
        for (metric, threshold) in &update.metrics {
            next.metrics.insert(metric.clone(), *threshold);
        }
        if let Some(connection) = update.connection {
            next.connection = connection;
        }
        next.generation = self.generation + 1;
        next.updated_at = now;
        Ok(next)
    }
}

/// A partial threshold reconfiguration, as accepted on the configuration
/// boundary. Metrics not mentioned keep their current bounds.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ThresholdUpdate {
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricThreshold>,
    #[serde(default)]
    pub connection: Option<ConnectionPolicy>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn reading_exactly_at_bound_is_not_a_breach() {
        let t = MetricThreshold::upper(60.0, 80.0);
        assert!(!t.breaches_warning(60.0));
        assert!(!t.breaches_error(80.0));
        assert!(t.breaches_warning(60.1));
        assert!(t.breaches_error(80.1));
    }

    #[test]
    fn band_threshold_breaches_on_both_sides() {
        let t = MetricThreshold::band(500.0, 2000.0, 200.0, 2500.0);
        assert!(t.breaches_error(199.9));
        assert!(t.breaches_error(2500.1));
        assert!(!t.breaches_error(200.0));
        assert!(!t.breaches_error(2500.0));
        assert!(t.breaches_warning(499.0));
        assert!(t.breaches_warning(2001.0));
        assert!(!t.breaches_warning(1500.0));
    }

    #[test]
    fn update_bumps_generation_and_merges() {
        let base = ThresholdSet::standard(Utc::now());
        let mut update = ThresholdUpdate::default();
        update
            .metrics
            .insert("temperature".into(), MetricThreshold::upper(55.0, 75.0));

        let next = base.apply_update(&update, Utc::now()).unwrap();
        assert_eq!(next.generation, 1);
        assert_eq!(next.metric("temperature").unwrap().error_high, Some(75.0));
        // Unmentioned metrics keep their bounds.
        assert_eq!(next.metric("pressure"), base.metric("pressure"));
    }

    #[test]
    fn warning_more_severe_than_error_is_rejected() {
        let base = ThresholdSet::standard(Utc::now());
        let mut update = ThresholdUpdate::default();
        update
            .metrics
            .insert("temperature".into(), MetricThreshold::upper(90.0, 80.0));

        let err = base.apply_update(&update, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        // The base set is untouched.
        assert_eq!(base.generation, 0);
    }

    #[test]
    fn empty_threshold_is_rejected() {
        let base = ThresholdSet::standard(Utc::now());
        let mut update = ThresholdUpdate::default();
        update.metrics.insert(
            "temperature".into(),
            MetricThreshold {
                warning_low: None,
                warning_high: None,
                error_low: None,
                error_high: None,
            },
        );
        assert!(base.apply_update(&update, Utc::now()).is_err());
    }

    #[test]
    fn offline_window_shorter_than_liveness_is_rejected() {
        let base = ThresholdSet::standard(Utc::now());
        let update = ThresholdUpdate {
            metrics: BTreeMap::new(),
            connection: Some(ConnectionPolicy {
                liveness_window_secs: 600,
                offline_window_secs: 300,
            }),
        };
        assert!(base.apply_update(&update, Utc::now()).is_err());
    }
}
