//! HTTP handlers for the prediction service.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::service::api::{HealthResponse, PredictResponse};
use crate::service::AppState;

/// Liveness check. Never touches the model.
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse::healthy()))
}

/// Classify one set of measurements.
///
/// Every failure (unparseable body, missing or non-numeric feature, model
/// load error) is reported as `400` with a `status: "error"` body.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<PredictResponse>) {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            log::warn!("Rejected prediction request: {}", rejection.body_text());
            return bad_request(rejection.body_text());
        }
    };

    let predictor = Arc::clone(&state.predictor);
    let outcome = tokio::task::spawn_blocking(move || predictor.predict(&input)).await;

    match outcome {
        Ok(Ok(prediction)) => {
            log::debug!(
                "Predicted {} (class {})",
                prediction.label,
                prediction.class_index
            );
            (StatusCode::OK, Json(prediction.into()))
        }
        Ok(Err(e)) => {
            log::warn!("Prediction failed: {}", e);
            bad_request(e.to_string())
        }
        Err(e) => {
            log::error!("Prediction task did not complete: {}", e);
            bad_request(e.to_string())
        }
    }
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<PredictResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(PredictResponse::error(message)),
    )
}
