//! The fitted bundle (feature order + scaler + classifier) and the
//! record → prediction pipeline.

use std::path::Path;

use candle_core::{Device, Tensor};
use cardiorisk_features::{encode, FeatureOrder, PatientRecord};
use serde::Serialize;
use tracing::debug;

use crate::classifier::LogisticClassifier;
use crate::error::{ModelError, Result};
use crate::scaler::StandardScaler;

/// Label 1 iff the positive-class probability is strictly above this.
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: u8,
    pub probability: f64,
}

impl Prediction {
    pub fn from_probability(probability: f64) -> Result<Self> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(ModelError::Prediction(format!(
                "classifier returned probability {}",
                probability
            )));
        }
        Ok(Self {
            prediction: u8::from(probability > DECISION_THRESHOLD),
            probability,
        })
    }
}

/// A feature vector laid out in the artifact's order, before and after
/// scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFeatures {
    pub columns: Vec<&'static str>,
    pub raw: Vec<f64>,
    pub scaled: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ModelArtifact {
    order: FeatureOrder,
    scaler: StandardScaler,
    classifier: LogisticClassifier,
    numeric_positions: Vec<usize>,
}

impl ModelArtifact {
    /// Bundle the three parts, rejecting any combination that could not
    /// have been trained together.
    pub fn new(order: FeatureOrder, scaler: StandardScaler, classifier: LogisticClassifier) -> Result<Self> {
        let numeric_positions = order.numeric_positions();
        if scaler.width() != numeric_positions.len() {
            return Err(ModelError::artifact_load(
                "scaler",
                format!(
                    "scaler covers {} columns but the feature order has {} numeric columns",
                    scaler.width(),
                    numeric_positions.len()
                ),
            ));
        }
        if classifier.n_features() != order.len() {
            return Err(ModelError::artifact_load(
                "model",
                format!(
                    "model expects {} features but the feature order lists {}",
                    classifier.n_features(),
                    order.len()
                ),
            ));
        }
        Ok(Self {
            order,
            scaler,
            classifier,
            numeric_positions,
        })
    }

    /// Decode the three persisted artifacts.
    pub fn from_bytes(model: &[u8], scaler: &[u8], features: &[u8]) -> Result<Self> {
        let order = FeatureOrder::from_json_slice(features)
            .map_err(|e| ModelError::artifact_load("features", e))?;
        let scaler = StandardScaler::from_safetensors_bytes(scaler)?;
        let classifier = LogisticClassifier::from_safetensors_bytes(model)?;
        Self::new(order, scaler, classifier)
    }

    pub fn order(&self) -> &FeatureOrder {
        &self.order
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &LogisticClassifier {
        &self.classifier
    }

    /// Encode, arrange and scale one record. Only numeric columns are scaled;
    /// dummy columns keep their 0/1 values.
    pub fn prepare(&self, record: &PatientRecord) -> Result<PreparedFeatures> {
        let features = encode(record)?;
        let raw = self.order.arrange(&features);
        let mut scaled = raw.clone();
        self.scaler.transform_positions(&mut scaled, &self.numeric_positions)?;
        Ok(PreparedFeatures {
            columns: self.order.names(),
            raw,
            scaled,
        })
    }

    pub fn predict(&self, record: &PatientRecord) -> Result<Prediction> {
        let prepared = self.prepare(record)?;
        self.predict_prepared(&prepared)
    }

    pub fn predict_prepared(&self, prepared: &PreparedFeatures) -> Result<Prediction> {
        let probability = self.probability(&prepared.scaled).map_err(|e| match e {
            ModelError::Tensor(e) => ModelError::Prediction(e.to_string()),
            other => other,
        })?;
        let prediction = Prediction::from_probability(probability)?;
        debug!(
            prediction = prediction.prediction,
            probability = prediction.probability,
            "Scored record"
        );
        Ok(prediction)
    }

    fn probability(&self, scaled: &[f64]) -> Result<f64> {
        let row: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_vec(row, (1, scaled.len()), &Device::Cpu)?;
        let proba = self.classifier.predict_proba(&input)?;
        proba
            .first()
            .map(|&p| p as f64)
            .ok_or_else(|| ModelError::Prediction("classifier returned no output".to_string()))
    }

    /// Write the model, scaler and feature order to their files.
    pub fn save(&self, model_path: &Path, scaler_path: &Path, features_path: &Path) -> Result<()> {
        for path in [model_path, scaler_path, features_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.classifier.save(model_path)?;
        self.scaler.save(scaler_path)?;
        let order = self
            .order
            .to_json_pretty()
            .map_err(std::io::Error::other)?;
        std::fs::write(features_path, order)?;
        Ok(())
    }
}
