//! Training report written next to the artifacts as `metrics.json`.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dataset::LoadStats;
use crate::explain::Attribution;
use crate::metrics::{Evaluation, FeatureWeight};
use crate::search::Candidate;

#[derive(Debug, Clone, Serialize)]
pub struct Hyperparameters {
    pub epochs: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    /// True when the values came from the grid search.
    pub searched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub dataset: String,
    pub rows: LoadStats,
    pub train_size: usize,
    pub test_size: usize,
    pub features: Vec<&'static str>,
    pub hyperparameters: Hyperparameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_search: Option<Vec<Candidate>>,
    pub test: Evaluation,
    pub coefficients: Vec<FeatureWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Vec<Attribution>>,
}

impl TrainingReport {
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
