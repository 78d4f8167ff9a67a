//! Integration tests for the threshold configuration endpoints.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get, send_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: GET returns the factory defaults at generation 0
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_thresholds_returns_standard_set() {
    let app = common::build_test_app();
    let json = expect_json(get(app, "/api/v1/thresholds").await, StatusCode::OK).await;

    assert_eq!(json["data"]["generation"], 0);
    assert_eq!(json["data"]["metrics"]["temperature"]["warning_high"], 60.0);
    assert_eq!(json["data"]["metrics"]["temperature"]["error_high"], 80.0);
    assert_eq!(json["data"]["metrics"]["speed"]["error_low"], 200.0);
    assert_eq!(json["data"]["connection"]["liveness_window_secs"], 300);
    assert_eq!(json["data"]["connection"]["offline_window_secs"], 1800);
}

// ---------------------------------------------------------------------------
// Test: PUT merges a partial update and bumps the generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn put_thresholds_merges_and_bumps_generation() {
    let app = common::build_test_app();

    let update = json!({
        "metrics": {
            "temperature": {
                "warning_low": null,
                "warning_high": 55.0,
                "error_low": null,
                "error_high": 75.0
            }
        }
    });
    let response = send_json(app.clone(), "PUT", "/api/v1/thresholds", update).await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["data"]["generation"], 1);
    assert_eq!(json["data"]["metrics"]["temperature"]["error_high"], 75.0);
    // Unmentioned metrics keep their factory bounds.
    assert_eq!(json["data"]["metrics"]["pressure"]["error_high"], 5.0);

    let fetched = expect_json(get(app, "/api/v1/thresholds").await, StatusCode::OK).await;
    assert_eq!(fetched["data"]["generation"], 1);
}

// ---------------------------------------------------------------------------
// Test: an invalid update is rejected and the prior set stays in effect
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_update_leaves_prior_set() {
    let app = common::build_test_app();

    // warning_high above error_high can never classify sensibly.
    let update = json!({
        "metrics": {
            "temperature": {
                "warning_low": null,
                "warning_high": 90.0,
                "error_low": null,
                "error_high": 80.0
            }
        }
    });
    let response = send_json(app.clone(), "PUT", "/api/v1/thresholds", update).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let fetched = expect_json(get(app, "/api/v1/thresholds").await, StatusCode::OK).await;
    assert_eq!(fetched["data"]["generation"], 0);
    assert_eq!(fetched["data"]["metrics"]["temperature"]["warning_high"], 60.0);
}

// ---------------------------------------------------------------------------
// Test: updated bounds drive subsequent classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn updated_thresholds_affect_classification() {
    let app = common::build_test_app();

    send_json(
        app.clone(),
        "PUT",
        "/api/v1/units/unit-a",
        json!({
            "name": "Unit A",
            "latitude": 0.0,
            "longitude": 0.0,
            "location": "Test",
            "system_type": null
        }),
    )
    .await;

    // 50 degrees is healthy under the factory bounds.
    let sample = |temp: f64| {
        json!({
            "data": {"temperature": temp},
            "timestamp": chrono::Utc::now().to_rfc3339()
        })
    };
    let response = send_json(
        app.clone(),
        "POST",
        "/api/v1/units/unit-a/samples",
        sample(50.0),
    )
    .await;
    let json = expect_json(response, StatusCode::ACCEPTED).await;
    assert_eq!(json["data"]["unit"]["severity"], "healthy");

    // Tighten the warning bound below the reading.
    send_json(
        app.clone(),
        "PUT",
        "/api/v1/thresholds",
        json!({
            "metrics": {
                "temperature": {
                    "warning_low": null,
                    "warning_high": 45.0,
                    "error_low": null,
                    "error_high": 80.0
                }
            }
        }),
    )
    .await;

    let response = send_json(
        app.clone(),
        "POST",
        "/api/v1/units/unit-a/samples",
        sample(50.0),
    )
    .await;
    let json = expect_json(response, StatusCode::ACCEPTED).await;
    assert_eq!(json["data"]["unit"]["severity"], "warning");
}
