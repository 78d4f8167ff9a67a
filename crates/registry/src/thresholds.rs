//! Shared handle for the threshold configuration in effect.
//!
//! Reads are frequent (every classification), updates rare. The handle
//! swaps a complete [`ThresholdSet`] behind an `Arc`, so readers always
//! observe one whole generation -- never a half-applied update.

use std::sync::Arc;

use machmon_core::error::CoreError;
use machmon_core::thresholds::{ThresholdSet, ThresholdUpdate};
use machmon_core::types::Timestamp;
use tokio::sync::RwLock;

pub struct ThresholdHandle {
    current: RwLock<Arc<ThresholdSet>>,
}

impl ThresholdHandle {
    pub fn new(initial: ThresholdSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The set currently in effect. The returned `Arc` stays valid for
    /// the whole classification even if an update lands concurrently.
    pub async fn load(&self) -> Arc<ThresholdSet> {
        Arc::clone(&*self.current.read().await)
    }

    /// Validate and merge a partial update, swapping in the next
    /// generation. On validation failure the prior set stays in effect.
    pub async fn apply(
        &self,
        update: &ThresholdUpdate,
        now: Timestamp,
    ) -> Result<ThresholdSet, CoreError> {
        let mut guard = self.current.write().await;
        let next = guard.apply_update(update, now)?;
        *guard = Arc::new(next.clone());
        tracing::info!(
            generation = next.generation,
            metrics = update.metrics.len(),
            "Threshold set updated",
        );
        Ok(next)
    }
}
