//! Message loop for a live feed connection.
//!
//! Reads frames from the WebSocket until the stream ends, errors, or
//! the stop signal fires. Malformed frames and samples for unknown
//! units are logged and skipped; they never tear down the connection.

use std::sync::Arc;

use futures::StreamExt;
use machmon_core::error::CoreError;
use machmon_registry::UnitStore;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::client::FeedConnection;
use crate::messages::{parse_message, FeedMessage};

/// Why the message loop ended.
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessorExit {
    /// The far end closed the connection or the stream errored.
    StreamEnded,
    /// The stop signal fired.
    Cancelled,
}

/// Drive a feed connection to completion, forwarding samples to the store.
pub async fn process_messages(
    conn: FeedConnection,
    store: Arc<UnitStore>,
    cancel: &CancellationToken,
) -> ProcessorExit {
    let mut ws_stream = conn.ws_stream;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Feed processor stopping");
                return ProcessorExit::Cancelled;
            }
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_frame(&text, &store).await;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // tungstenite answers pings itself.
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Feed closed the connection");
                        return ProcessorExit::StreamEnded;
                    }
                    Some(Ok(other)) => {
                        tracing::debug!("Ignoring non-text feed frame: {other:?}");
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Feed stream error");
                        return ProcessorExit::StreamEnded;
                    }
                    None => {
                        tracing::info!("Feed stream ended");
                        return ProcessorExit::StreamEnded;
                    }
                }
            }
        }
    }
}

async fn handle_text_frame(text: &str, store: &UnitStore) {
    let msg = match parse_message(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed feed message");
            return;
        }
    };

    match msg {
        FeedMessage::UnitUpdate(update) => {
            let (unit_id, snapshot, sampled_at) = update.into_snapshot();
            match store.apply_sample(&unit_id, snapshot, sampled_at).await {
                Ok(_) => {}
                Err(CoreError::NotFound { .. }) => {
                    tracing::warn!(
                        unit_id = %unit_id,
                        "Dropping sample for unregistered unit",
                    );
                }
                Err(e) => {
                    tracing::error!(
                        unit_id = %unit_id,
                        error = %e,
                        "Failed to apply feed sample",
                    );
                }
            }
        }
        FeedMessage::Heartbeat => {
            tracing::trace!("Feed heartbeat");
        }
    }
}
