use std::sync::Arc;

use machmon_events::EventHub;
use machmon_feed::FeedState;
use machmon_registry::UnitStore;
use tokio::sync::watch;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Unit registry holding live state, history, and thresholds.
    pub store: Arc<UnitStore>,
    /// Broadcast hub fanning status events out to WebSocket clients.
    pub hub: Arc<EventHub>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live view of the upstream feed connection state, when a feed is
    /// configured.
    pub feed_state: Option<watch::Receiver<FeedState>>,
}
