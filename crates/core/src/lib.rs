//! Pure domain logic for the machine monitor.
//!
//! No I/O and no shared state live here: severity classification,
//! threshold bookkeeping, and the wire-level sample types are all plain
//! data plus pure functions, safe to call concurrently from any caller.

pub mod classifier;
pub mod error;
pub mod metric_names;
pub mod sample;
pub mod severity;
pub mod thresholds;
pub mod types;
