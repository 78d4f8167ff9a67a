//! Route definitions and handlers for unit state endpoints.
//!
//! ```text
//! GET  /units                 -> current state of all units
//! PUT  /units/{id}            -> register or update a unit
//! GET  /units/{id}            -> current state of one unit
//! GET  /units/{id}/history    -> bounded status history
//! POST /units/{id}/samples    -> ingest one telemetry sample
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Duration;
use machmon_core::error::CoreError;
use machmon_core::sample::{HistoryEntry, MetricSnapshot, UnitMetadata};
use machmon_core::types::Timestamp;
use machmon_registry::UnitState;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// How many hours of history to return (default: 24).
    pub hours: Option<i64>,
}

/// Request body for the sample ingest endpoint.
#[derive(Debug, Deserialize)]
pub struct IngestSampleRequest {
    /// Metric name -> reading. Absent metrics are absent, not zero.
    #[serde(default)]
    pub data: std::collections::BTreeMap<String, f64>,
    pub timestamp: Timestamp,
}

/// Response body for the sample ingest endpoint.
#[derive(Debug, Serialize)]
pub struct IngestSampleResponse {
    /// Whether the sample changed the unit's reported severity.
    pub severity_changed: bool,
    pub unit: UnitState,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /units
async fn list_units(State(state): State<AppState>) -> Json<DataResponse<Vec<UnitState>>> {
    let units = state.store.list_all().await;
    Json(DataResponse { data: units })
}

/// PUT /units/{id}
///
/// Register a unit or update its metadata. Idempotent: registering an
/// existing id replaces the metadata and leaves telemetry state alone.
async fn register_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(metadata): Json<UnitMetadata>,
) -> AppResult<Json<DataResponse<UnitState>>> {
    if id.trim().is_empty() {
        return Err(AppError::BadRequest("Unit id must not be empty".into()));
    }

    state.store.register_unit(&id, metadata).await;
    let unit = state
        .store
        .get(&id)
        .await
        .ok_or_else(|| AppError::InternalError(format!("Unit {id} vanished after registration")))?;

    Ok(Json(DataResponse { data: unit }))
}

/// GET /units/{id}
async fn get_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<UnitState>>> {
    let unit = state.store.get(&id).await.ok_or(CoreError::NotFound {
        entity: "unit",
        id: id.clone(),
    })?;
    Ok(Json(DataResponse { data: unit }))
}

/// GET /units/{id}/history?hours=N
async fn unit_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<DataResponse<Vec<HistoryEntry>>>> {
    let hours = query.hours.unwrap_or(24);
    if !(1..=720).contains(&hours) {
        return Err(AppError::BadRequest(
            "hours must be between 1 and 720".to_string(),
        ));
    }

    // Unknown ids report an empty history rather than 404: dashboards
    // poll history for units that may not have registered yet.
    let entries = state.store.history(&id, Duration::hours(hours)).await;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /units/{id}/samples
async fn ingest_sample(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<IngestSampleRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<IngestSampleResponse>>)> {
    let snapshot = MetricSnapshot {
        readings: input.data,
        sampled_at: input.timestamp,
    };

    let severity_changed = state
        .store
        .apply_sample(&id, snapshot, input.timestamp)
        .await?;

    let unit = state
        .store
        .get(&id)
        .await
        .ok_or_else(|| AppError::InternalError(format!("Unit {id} vanished after ingest")))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: IngestSampleResponse {
                severity_changed,
                unit,
            },
        }),
    ))
}

/// Unit routes mounted at `/units`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_units))
        .route("/{id}", put(register_unit).get(get_unit))
        .route("/{id}/history", get(unit_history))
        .route("/{id}/samples", post(ingest_sample))
}
