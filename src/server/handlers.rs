//! Request handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::state::AppState;
use crate::inference::{predict_customer, CustomerRecord, Prediction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.model_loaded(),
    })
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<CustomerRecord>,
) -> Result<Json<Prediction>, ApiError> {
    let model = state.model.clone().ok_or(ApiError::ModelNotLoaded)?;

    let prediction = tokio::task::spawn_blocking(move || predict_customer(&model, &record))
        .await
        .map_err(|e| ApiError::Internal(format!("prediction task failed: {}", e)))??;

    tracing::debug!(
        probability = prediction.churn_probability,
        risk = %prediction.risk_level,
        "Prediction served"
    );
    Ok(Json(prediction))
}
