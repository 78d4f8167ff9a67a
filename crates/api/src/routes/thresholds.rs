//! Route definitions and handlers for classification thresholds.
//!
//! ```text
//! GET /thresholds    -> current threshold set
//! PUT /thresholds    -> apply a partial update (validated atomically)
//! ```

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use machmon_core::thresholds::{ThresholdSet, ThresholdUpdate};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /thresholds
async fn get_thresholds(State(state): State<AppState>) -> Json<DataResponse<ThresholdSet>> {
    let thresholds = state.store.thresholds().await;
    Json(DataResponse {
        data: (*thresholds).clone(),
    })
}

/// PUT /thresholds
///
/// Apply a partial threshold update. The whole update is validated
/// before any of it takes effect; a rejected update leaves the prior
/// set in place. Already-classified states are not retroactively
/// re-evaluated -- the next sample or sweep picks up the new bounds.
async fn update_thresholds(
    State(state): State<AppState>,
    Json(update): Json<ThresholdUpdate>,
) -> AppResult<Json<DataResponse<ThresholdSet>>> {
    let applied = state.store.update_thresholds(&update).await?;
    tracing::info!(generation = applied.generation, "Thresholds updated");
    Ok(Json(DataResponse { data: applied }))
}

/// Threshold routes mounted at `/thresholds`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_thresholds).put(update_thresholds))
}
