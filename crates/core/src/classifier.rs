//! Pure severity classification.
//!
//! No I/O and no shared state. The caller fetches the unit's last-seen
//! timestamp, its latest snapshot, and the threshold set in effect, and
//! passes them in; the same inputs always produce the same state.

use crate::sample::MetricSnapshot;
use crate::severity::Severity;
use crate::thresholds::ThresholdSet;
use crate::types::Timestamp;

/// Classify a unit's health at instant `now`.
///
/// States are evaluated in strict priority order:
///
/// 1. `Disconnected` -- no feed context at all (`last_seen` is `None`),
///    or silence beyond the offline window.
/// 2. `Unreachable` -- silence beyond the liveness window. This takes
///    priority over any metric-derived state: stale readings cannot be
///    trusted, so a silent unit with critical-looking metrics reports
///    `Unreachable`, not `Critical`.
/// 3. `Critical` / `Warning` -- any reading strictly beyond an error /
///    warning bound. A reading exactly equal to a bound is not a breach.
/// 4. `Healthy` otherwise.
///
/// Metrics absent from the snapshot are absent, not zero, and can never
/// trigger a breach; readings without configured bounds are ignored.
pub fn classify(
    now: Timestamp,
    last_seen: Option<Timestamp>,
    snapshot: &MetricSnapshot,
    thresholds: &ThresholdSet,
) -> Severity {
    let last_seen = match last_seen {
        Some(ts) => ts,
        None => return Severity::Disconnected,
    };

    let silence = now.signed_duration_since(last_seen);
    if silence > thresholds.connection.offline_window() {
        return Severity::Disconnected;
    }
    if silence > thresholds.connection.liveness_window() {
        return Severity::Unreachable;
    }

    let mut worst = Severity::Healthy;
    for (metric, value) in &snapshot.readings {
        let Some(bounds) = thresholds.metric(metric) else {
            continue;
        };
        if bounds.breaches_error(*value) {
            return Severity::Critical;
        }
        if bounds.breaches_warning(*value) {
            worst = Severity::Warning;
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric_names::{METRIC_PRESSURE, METRIC_SPEED, METRIC_TEMPERATURE};
    use chrono::{Duration, Utc};

    fn thresholds() -> ThresholdSet {
        ThresholdSet::standard(Utc::now())
    }

    fn snap(readings: &[(&str, f64)]) -> MetricSnapshot {
        MetricSnapshot::new(readings.iter().map(|(k, v)| (*k, *v)), Utc::now())
    }

    #[test]
    fn never_seen_is_disconnected() {
        let now = Utc::now();
        let state = classify(now, None, &snap(&[(METRIC_TEMPERATURE, 40.0)]), &thresholds());
        assert_eq!(state, Severity::Disconnected);
    }

    #[test]
    fn silence_beyond_offline_window_is_disconnected() {
        let now = Utc::now();
        let last_seen = now - Duration::minutes(31);
        let state = classify(now, Some(last_seen), &snap(&[]), &thresholds());
        assert_eq!(state, Severity::Disconnected);
    }

    #[test]
    fn silence_beyond_liveness_window_is_unreachable() {
        let now = Utc::now();
        let last_seen = now - Duration::minutes(6);
        let state = classify(now, Some(last_seen), &snap(&[]), &thresholds());
        assert_eq!(state, Severity::Unreachable);
    }

    #[test]
    fn unreachable_takes_priority_over_stale_critical_metrics() {
        let now = Utc::now();
        let last_seen = now - Duration::minutes(6);
        // Temperature way past the error bound, but the unit is silent.
        let state = classify(
            now,
            Some(last_seen),
            &snap(&[(METRIC_TEMPERATURE, 99.0)]),
            &thresholds(),
        );
        assert_eq!(state, Severity::Unreachable);
    }

    #[test]
    fn healthy_when_all_readings_within_bounds() {
        let now = Utc::now();
        let state = classify(
            now,
            Some(now),
            &snap(&[
                (METRIC_TEMPERATURE, 42.1),
                (METRIC_PRESSURE, 2.2),
                (METRIC_SPEED, 1450.0),
            ]),
            &thresholds(),
        );
        assert_eq!(state, Severity::Healthy);
    }

    #[test]
    fn reading_exactly_at_error_bound_is_not_critical() {
        let now = Utc::now();
        // Default temperature error bound is 80.0; the exact bound value
        // must classify one level down, not Critical.
        let state = classify(
            now,
            Some(now),
            &snap(&[(METRIC_TEMPERATURE, 80.0)]),
            &thresholds(),
        );
        assert_eq!(state, Severity::Warning);

        let state = classify(
            now,
            Some(now),
            &snap(&[(METRIC_TEMPERATURE, 80.1)]),
            &thresholds(),
        );
        assert_eq!(state, Severity::Critical);
    }

    #[test]
    fn reading_exactly_at_warning_bound_is_healthy() {
        let now = Utc::now();
        let state = classify(
            now,
            Some(now),
            &snap(&[(METRIC_TEMPERATURE, 60.0)]),
            &thresholds(),
        );
        assert_eq!(state, Severity::Healthy);
    }

    #[test]
    fn error_breach_wins_over_warning_breach() {
        let now = Utc::now();
        let state = classify(
            now,
            Some(now),
            &snap(&[(METRIC_TEMPERATURE, 65.0), (METRIC_PRESSURE, 5.5)]),
            &thresholds(),
        );
        assert_eq!(state, Severity::Critical);
    }

    #[test]
    fn speed_below_lower_error_bound_is_critical() {
        let now = Utc::now();
        let state = classify(now, Some(now), &snap(&[(METRIC_SPEED, 150.0)]), &thresholds());
        assert_eq!(state, Severity::Critical);
    }

    #[test]
    fn speed_below_lower_warning_bound_is_warning() {
        let now = Utc::now();
        let state = classify(now, Some(now), &snap(&[(METRIC_SPEED, 450.0)]), &thresholds());
        assert_eq!(state, Severity::Warning);
    }

    #[test]
    fn missing_metrics_never_breach() {
        let now = Utc::now();
        // Speed has a lower error bound of 200; an absent speed reading
        // must not be treated as zero.
        let state = classify(
            now,
            Some(now),
            &snap(&[(METRIC_TEMPERATURE, 40.0)]),
            &thresholds(),
        );
        assert_eq!(state, Severity::Healthy);
    }

    #[test]
    fn unconfigured_metric_is_ignored() {
        let now = Utc::now();
        let state = classify(now, Some(now), &snap(&[("vibration", 1e9)]), &thresholds());
        assert_eq!(state, Severity::Healthy);
    }
}
