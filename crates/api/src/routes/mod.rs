pub mod health;
pub mod thresholds;
pub mod units;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                          WebSocket (live status events)
///
/// /units                       list all units (GET)
/// /units/{id}                  register/update (PUT), current state (GET)
/// /units/{id}/history          status history (GET)
/// /units/{id}/samples          ingest a telemetry sample (POST)
///
/// /thresholds                  current set (GET), partial update (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::handler::ws_handler))
        .nest("/units", units::router())
        .nest("/thresholds", thresholds::router())
}
