//! Periodic cleanup of old status history.
//!
//! Spawns a background loop that purges history entries older than the
//! configured retention period. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use machmon_registry::UnitStore;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the history retention cleanup loop.
///
/// Purges history entries older than `retention_days`. Runs until
/// `cancel` is triggered.
pub async fn run(store: Arc<UnitStore>, retention_days: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_days,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "History retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("History retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                let removed = store.purge_history(cutoff).await;
                if removed > 0 {
                    tracing::info!(removed, "History retention: purged old entries");
                } else {
                    tracing::debug!("History retention: nothing to purge");
                }
            }
        }
    }
}
