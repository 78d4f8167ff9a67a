//! The authoritative in-process unit state store.
//!
//! [`UnitStore`] owns the current state and bounded history of every
//! registered unit, applies classifier output under a per-unit mutation
//! discipline, and pushes committed state changes to the
//! [`machmon_events::EventHub`]. All producers (ingest, the feed client,
//! the liveness sweep) commit through the same entry points.

pub mod history;
pub mod store;
pub mod thresholds;

pub use store::{UnitState, UnitStore};
pub use thresholds::ThresholdHandle;
