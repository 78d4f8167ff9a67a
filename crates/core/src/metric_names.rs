//! Well-known metric name constants and feed message types.
//!
//! These are the canonical metric names used in the threshold table, the
//! status classifier, and the unit-to-monitor feed protocol.

/// Feed/live message type discriminator for unit state updates.
///
/// Used by the feed client when parsing upstream frames and by the live
/// boundary when broadcasting to subscribers.
pub const MSG_TYPE_UNIT_UPDATE: &str = "unit_update";

/// Process temperature in degrees Celsius. Bounded above only.
pub const METRIC_TEMPERATURE: &str = "temperature";

/// Line pressure in bar. Bounded above only.
pub const METRIC_PRESSURE: &str = "pressure";

/// Rotational speed in RPM. Bounded below and above: running too slow
/// is as bad as running too fast.
pub const METRIC_SPEED: &str = "speed";

/// Local storage utilization as a percentage. Bounded above only.
pub const METRIC_DISK_VOLUME: &str = "disk_volume";
