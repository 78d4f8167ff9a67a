use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;

/// Interval between heartbeat pings sent to each client.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is subscribed to the event hub and
/// receives every status event published while it is connected. There
/// is no backfill: clients fetch current state over REST first, then
/// follow the live stream.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Subscribes to the event hub.
///   2. Spawns a sender task that forwards hub events and heartbeats.
///   3. Processes inbound frames on the current task.
///   4. Unsubscribes on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sub_id, mut rx) = state.hub.subscribe().await;
    tracing::info!(subscriber = %sub_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward hub events to the sink, pinging between them
    // so half-dead connections are detected.
    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await; // first tick fires immediately

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else {
                        // Hub shut down or this subscriber was dropped.
                        break;
                    };
                    let text = event.to_message().to_string();
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Receiver loop: clients do not send commands; we only track
    // liveness and close frames.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(subscriber = %sub_id, "Pong received");
            }
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(subscriber = %sub_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.hub.unsubscribe(sub_id).await;
    send_task.abort();
    tracing::info!(subscriber = %sub_id, "WebSocket disconnected");
}
