//! Background maintenance tasks spawned at startup.

pub mod history_retention;
pub mod liveness_sweep;
