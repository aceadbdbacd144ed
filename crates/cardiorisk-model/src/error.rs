//! Error types for artifact loading and prediction.

use cardiorisk_features::ValidationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    /// Bad or incomplete patient input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An artifact could not be fetched, parsed or reconciled with the
    /// others. Never cached: the next request retries the load.
    #[error("Failed to load {artifact}: {reason}")]
    ArtifactLoad {
        artifact: &'static str,
        reason: String,
    },

    /// Unexpected failure inside the scaler or classifier.
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// Fitting a scaler or classifier on training data failed.
    #[error("Fitting failed: {0}")]
    Fit(String),

    #[error("Tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    pub fn artifact_load(artifact: &'static str, reason: impl ToString) -> Self {
        ModelError::ArtifactLoad {
            artifact,
            reason: reason.to_string(),
        }
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ModelError::Validation(_))
    }
}
