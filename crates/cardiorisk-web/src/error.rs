//! API errors and their JSON representation.
//!
//! Every error body carries a stable `error` field. Server-side failures add
//! a `hint`; their internal detail is logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardiorisk_features::ValidationError;
use cardiorisk_model::ModelError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

const UNAVAILABLE_HINT: &str = "Check that the model, scaler and features.json artifacts exist in the \
     artifact directory, or that MODEL_URL and SCALER_URL are reachable. The load is retried on the next request.";
const PREDICTION_HINT: &str = "The loaded artifacts could not score this record. Retrain or redeploy them.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not valid JSON.
    #[error("Invalid JSON body: {0}")]
    MalformedJson(String),

    /// Query string could not be parsed.
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Artifacts could not be loaded. Holds the underlying reason.
    #[error("Model unavailable")]
    ModelUnavailable(String),

    #[error("Prediction failed")]
    PredictionFailed(String),
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(e) => ApiError::Validation(e),
            ModelError::ArtifactLoad { .. } => ApiError::ModelUnavailable(err.to_string()),
            other => ApiError::PredictionFailed(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedJson(_) | ApiError::InvalidQuery(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ModelUnavailable(_) | ApiError::PredictionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::ModelUnavailable(detail) => {
                error!(detail = %detail, "Model unavailable");
                json!({ "error": self.to_string(), "hint": UNAVAILABLE_HINT })
            }
            ApiError::PredictionFailed(detail) => {
                error!(detail = %detail, "Prediction failed");
                json!({ "error": self.to_string(), "hint": PREDICTION_HINT })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
