//! Periodic liveness sweep.
//!
//! Reclassifies every unit on a fixed interval so silence degrades a
//! unit even when no new sample ever arrives. The sweep is the only
//! path that can move a unit to `Unreachable` or `Disconnected` purely
//! by the passage of time.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use machmon_registry::UnitStore;
use tokio_util::sync::CancellationToken;

/// Run the liveness sweep loop.
///
/// Sweeps on `interval` until `cancel` is triggered.
pub async fn run(store: Arc<UnitStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Liveness sweep started"
    );

    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so a restart does not
    // sweep before the feed has had a chance to reconnect.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Liveness sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                let transitions = store.sweep(Utc::now()).await;
                if transitions > 0 {
                    tracing::info!(transitions, "Liveness sweep degraded units");
                } else {
                    tracing::debug!("Liveness sweep: no transitions");
                }
            }
        }
    }
}
