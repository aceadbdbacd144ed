//! POST /predict: score one patient record.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use cardiorisk_features::PatientRecord;
use cardiorisk_model::PreparedFeatures;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct PredictParams {
    /// Echo the ordered, scaled feature vector back to the caller.
    #[serde(default)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Explanation>,
}

#[derive(Debug, Serialize)]
pub struct Explanation {
    pub ordered: Vec<&'static str>,
    pub scaled: Map<String, Value>,
}

impl From<&PreparedFeatures> for Explanation {
    fn from(prepared: &PreparedFeatures) -> Self {
        let scaled = prepared
            .columns
            .iter()
            .zip(&prepared.scaled)
            .map(|(name, value)| (name.to_string(), Value::from(round6(*value))))
            .collect();
        Self {
            ordered: prepared.columns.clone(),
            scaled,
        }
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// The body is taken as raw bytes, and query rejections are caught, so
/// malformed input gets the same JSON error shape as every other 400. Input is validated before the artifacts are
/// touched.
pub async fn predict(
    State(state): State<SharedState>,
    params: Result<Query<PredictParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedJson(e.to_string()))?;
    let record = PatientRecord::from_json(&payload)?;
    debug!(?record, "Validated prediction request");

    let artifact = state.store.get().await?;
    let prepared = artifact.prepare(&record)?;
    let prediction = artifact.predict_prepared(&prepared)?;

    Ok(Json(PredictResponse {
        prediction: prediction.prediction,
        probability: prediction.probability,
        features: params.explain.then(|| Explanation::from(&prepared)),
    }))
}
