//! WebSocket client for connecting to the upstream feed.
//!
//! [`FeedClient`] holds the connection configuration for one feed
//! endpoint. Call [`FeedClient::connect`] to establish a live
//! [`FeedConnection`].

use tokio_tungstenite::{connect_async, MaybeTlsStream};

/// Configuration handle for one upstream feed endpoint.
///
/// The far end is treated as an opaque stream of parseable sample
/// messages; the URL and credentials are supplied externally.
pub struct FeedClient {
    ws_url: String,
    auth_token: Option<String>,
}

/// A live WebSocket connection to the feed.
pub struct FeedConnection {
    /// Unique client ID sent during the WebSocket handshake.
    pub client_id: String,
    /// The raw WebSocket stream for reading frames.
    pub ws_stream: tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl FeedClient {
    /// Create a client targeting a feed endpoint.
    ///
    /// * `ws_url`     - WebSocket URL, e.g. `wss://feed.example.com/ws`.
    /// * `auth_token` - optional bearer token passed on the handshake.
    pub fn new(ws_url: String, auth_token: Option<String>) -> Self {
        Self { ws_url, auth_token }
    }

    /// WebSocket URL of the feed endpoint.
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Connect to the feed endpoint.
    ///
    /// Generates a unique `client_id` (UUID v4) and appends it as a
    /// query parameter, along with the auth token when configured, so
    /// the far end can attribute and authorize the stream.
    pub async fn connect(&self) -> Result<FeedConnection, FeedClientError> {
        let client_id = uuid::Uuid::new_v4().to_string();
        let mut url = format!("{}?client_id={}", self.ws_url, client_id);
        if let Some(token) = &self.auth_token {
            url.push_str(&format!("&token={token}"));
        }

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            FeedClientError::Connection(format!(
                "Failed to connect to feed at {}: {e}",
                self.ws_url
            ))
        })?;

        tracing::info!(
            client_id = %client_id,
            "Connected to feed at {}",
            self.ws_url,
        );

        Ok(FeedConnection {
            client_id,
            ws_stream,
        })
    }
}

/// Errors that can occur when working with the feed client.
#[derive(Debug, thiserror::Error)]
pub enum FeedClientError {
    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A protocol-level error on an already-established connection.
    #[error("Protocol error: {0}")]
    Protocol(String),
}
