//! Shared helpers for API integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use machmon_api::config::ServerConfig;
use machmon_api::router::build_app_router;
use machmon_api::state::AppState;
use machmon_core::thresholds::ThresholdSet;
use machmon_events::EventHub;
use machmon_registry::UnitStore;
use tower::ServiceExt;

/// Build a test application with a fresh store, hub, and default config.
pub fn build_test_app() -> Router {
    let hub = Arc::new(EventHub::new());
    let store = Arc::new(UnitStore::new(
        ThresholdSet::standard(chrono::Utc::now()),
        Arc::clone(&hub),
    ));

    let state = AppState {
        store,
        hub,
        config: Arc::new(ServerConfig::default()),
        feed_state: None,
    };

    build_app_router(state, &ServerConfig::default())
}

/// Send a GET request and return the response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request"),
    )
    .await
    .expect("Request failed")
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
    )
    .await
    .expect("Request failed")
}

/// Read the full response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not valid JSON")
}

/// Assert status and return the parsed body in one step.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
