//! Connection state machine and task entry point for the feed.
//!
//! [`spawn_feed`] starts a background task that connects to the
//! upstream feed, streams samples into the store, and reconnects with
//! bounded backoff when the connection drops. Observers can watch the
//! connection state through the returned [`watch::Receiver`].

use std::sync::Arc;

use machmon_registry::UnitStore;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::FeedClient;
use crate::processor::{process_messages, ProcessorExit};
use crate::reconnect::{reconnect_loop, ReconnectConfig, ReconnectOutcome};

/// Lifecycle state of the feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedState {
    /// Not yet started, or stopped on request.
    Disconnected,
    /// First connection attempt in flight.
    Connecting,
    /// Live and streaming samples.
    Connected,
    /// Connection lost, retrying with backoff.
    Reconnecting,
    /// Retry budget exhausted. Terminal until restart.
    Failed,
}

/// Handle to a running feed task.
pub struct FeedHandle {
    /// Watch channel carrying the current [`FeedState`].
    pub state: watch::Receiver<FeedState>,
    /// Join handle for the background task.
    pub task: JoinHandle<()>,
}

/// Spawn the feed task.
///
/// The task runs until the token is cancelled or the reconnect budget
/// is exhausted, whichever comes first. Exhaustion parks the task in
/// [`FeedState::Failed`]; units then age out through the liveness
/// sweep rather than showing stale data as current.
pub fn spawn_feed(
    client: FeedClient,
    config: ReconnectConfig,
    store: Arc<UnitStore>,
    cancel: CancellationToken,
) -> FeedHandle {
    let (state_tx, state_rx) = watch::channel(FeedState::Disconnected);

    let task = tokio::spawn(async move {
        run(client, config, store, cancel, state_tx).await;
    });

    FeedHandle {
        state: state_rx,
        task,
    }
}

async fn run(
    client: FeedClient,
    config: ReconnectConfig,
    store: Arc<UnitStore>,
    cancel: CancellationToken,
    state_tx: watch::Sender<FeedState>,
) {
    let _ = state_tx.send(FeedState::Connecting);

    // The initial connection goes through the same bounded retry loop
    // as reconnections, so a feed that is down at startup fails over
    // to the sweep instead of blocking forever.
    let mut conn = match reconnect_loop(&client, &config, &cancel).await {
        ReconnectOutcome::Connected(conn) => conn,
        ReconnectOutcome::Cancelled => {
            let _ = state_tx.send(FeedState::Disconnected);
            return;
        }
        ReconnectOutcome::Exhausted => {
            let _ = state_tx.send(FeedState::Failed);
            return;
        }
    };

    loop {
        let _ = state_tx.send(FeedState::Connected);

        match process_messages(conn, Arc::clone(&store), &cancel).await {
            ProcessorExit::Cancelled => {
                let _ = state_tx.send(FeedState::Disconnected);
                return;
            }
            ProcessorExit::StreamEnded => {
                let _ = state_tx.send(FeedState::Reconnecting);
            }
        }

        conn = match reconnect_loop(&client, &config, &cancel).await {
            ReconnectOutcome::Connected(conn) => conn,
            ReconnectOutcome::Cancelled => {
                let _ = state_tx.send(FeedState::Disconnected);
                return;
            }
            ReconnectOutcome::Exhausted => {
                let _ = state_tx.send(FeedState::Failed);
                return;
            }
        };
    }
}
