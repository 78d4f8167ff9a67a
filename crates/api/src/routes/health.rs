use axum::extract::State;
use axum::{routing::get, Json, Router};
use machmon_feed::FeedState;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Number of registered units.
    pub unit_count: usize,
    /// Upstream feed connection state, when a feed is configured.
    pub feed_state: Option<FeedState>,
}

/// GET /health -- returns service health and feed connectivity.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let unit_count = state.store.unit_count().await;
    let feed_state = state.feed_state.as_ref().map(|rx| *rx.borrow());

    // A failed feed degrades the service but samples can still arrive
    // through the ingest endpoint.
    let status = match feed_state {
        Some(FeedState::Failed) => "degraded",
        _ => "ok",
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        unit_count,
        feed_state,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
