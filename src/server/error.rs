//! Error responses for the prediction API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::ChurnError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Model not loaded. Train the model first.")]
    ModelNotLoaded,

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ChurnError> for ApiError {
    fn from(err: ChurnError) -> Self {
        match err {
            ChurnError::ModelUnavailable { .. } => ApiError::ModelNotLoaded,
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(msg) => {
                tracing::warn!(detail = %msg, "Prediction rejected");
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(msg) => {
                tracing::error!(detail = %msg, "Prediction failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": true,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let unavailable = ChurnError::ModelUnavailable { tried: vec![] };
        assert_eq!(
            ApiError::from(unavailable).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let bad = ChurnError::inference("column 'tenure' missing");
        assert_eq!(
            ApiError::from(bad).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("join".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
