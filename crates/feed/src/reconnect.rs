//! Bounded-retry exponential-backoff reconnection for the feed.
//!
//! When the feed connection drops, the runner calls [`reconnect_loop`]
//! to retry with increasing delays. Unlike an endless retry loop, the
//! attempt count is bounded: exhausting it is a terminal outcome and the
//! affected units are left to the liveness sweep, which degrades them
//! to `Unreachable`/`Disconnected` instead of freezing their last state.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{FeedClient, FeedConnection};

/// Tunable parameters for the backoff strategy.
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Maximum number of connection attempts before giving up.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 10,
        }
    }
}

/// How a reconnection round ended.
pub enum ReconnectOutcome {
    /// A connection was re-established.
    Connected(FeedConnection),
    /// The stop signal was raised; no further attempts were started.
    Cancelled,
    /// All configured attempts failed. Terminal for this connection.
    Exhausted,
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Attempt to reconnect to the feed with exponential backoff.
///
/// Makes at most [`ReconnectConfig::max_attempts`] attempts. The
/// cancellation token is checked at the top of every iteration and
/// during every backoff wait, so no attempt can start after stop has
/// been requested -- even one that was already scheduled.
pub async fn reconnect_loop(
    client: &FeedClient,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> ReconnectOutcome {
    let mut delay = config.initial_delay;

    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            tracing::info!("Reconnect cancelled");
            return ReconnectOutcome::Cancelled;
        }

        tracing::info!(
            attempt,
            max_attempts = config.max_attempts,
            "Reconnecting to feed",
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reconnect cancelled");
                return ReconnectOutcome::Cancelled;
            }
            result = client.connect() => {
                match result {
                    Ok(conn) => {
                        tracing::info!(attempt, "Reconnected to feed");
                        return ReconnectOutcome::Connected(conn);
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "Reconnect attempt {attempt} of {} failed",
                            config.max_attempts,
                        );
                    }
                }
            }
        }

        if attempt == config.max_attempts {
            break;
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return ReconnectOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, config);
    }

    tracing::error!(
        max_attempts = config.max_attempts,
        "Feed reconnect attempts exhausted",
    );
    ReconnectOutcome::Exhausted
}
