//! Configuration loading for Cardiorisk.
//! Reads cardio.toml from the current directory or the path in the
//! CARDIO_CONFIG env var, then applies environment overrides
//! (MODEL_URL, SCALER_URL, SKIP_GRIDSEARCH, ...).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "CARDIO_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "cardio.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardioConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Load artifacts at startup instead of on the first request.
    #[serde(default = "bool_true")]
    pub preload: bool,
}

fn default_bind_addr() -> String { "0.0.0.0:8000".to_string() }
fn bool_true()         -> bool   { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            preload: true,
        }
    }
}

/// Where the model, scaler and feature order live.
///
/// Each artifact is read from `dir` unless a URL is configured for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    #[serde(default = "default_features_file")]
    pub features_file: String,
    #[serde(default = "default_report_file")]
    pub report_file: String,
    pub model_url: Option<String>,
    pub scaler_url: Option<String>,
    pub features_url: Option<String>,
    /// Upper bound on any single artifact download.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_artifact_dir()  -> PathBuf { PathBuf::from("artifacts") }
fn default_model_file()    -> String  { "cardio_model.safetensors".to_string() }
fn default_scaler_file()   -> String  { "cardio_scaler.safetensors".to_string() }
fn default_features_file() -> String  { "features.json".to_string() }
fn default_report_file()   -> String  { "metrics.json".to_string() }
fn default_fetch_timeout() -> u64     { 30 }

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
            model_file: default_model_file(),
            scaler_file: default_scaler_file(),
            features_file: default_features_file(),
            report_file: default_report_file(),
            model_url: None,
            scaler_url: None,
            features_url: None,
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl ArtifactConfig {
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler_file)
    }

    pub fn features_path(&self) -> PathBuf {
        self.dir.join(&self.features_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(&self.report_file)
    }

    /// True when the model and scaler are downloaded rather than read locally.
    pub fn is_remote(&self) -> bool {
        self.model_url.is_some() && self.scaler_url.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub weight_decay: f64,
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    /// Set by SKIP_GRIDSEARCH=1.
    #[serde(default)]
    pub skip_grid_search: bool,
    /// Set by SKIP_SHAP=1.
    #[serde(default)]
    pub skip_explain: bool,
    #[serde(default = "default_explain_samples")]
    pub explain_samples: usize,
}

fn default_dataset()         -> PathBuf { PathBuf::from("cardio_train.csv") }
fn default_test_fraction()   -> f64     { 0.2 }
fn default_seed()            -> u64     { 42 }
fn default_epochs()          -> usize   { 300 }
fn default_learning_rate()   -> f64     { 0.05 }
fn default_cv_folds()        -> usize   { 3 }
fn default_explain_samples() -> usize   { 1000 }

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            weight_decay: 0.0,
            cv_folds: default_cv_folds(),
            skip_grid_search: false,
            skip_explain: false,
            explain_samples: default_explain_samples(),
        }
    }
}


impl CardioConfig {
    /// Load configuration from cardio.toml (or $CARDIO_CONFIG) and the
    /// process environment.
    ///
    /// A missing default file is not an error: every field has a default,
    /// so a bare deployment only needs env vars. An explicit CARDIO_CONFIG
    /// that points nowhere is.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_ENV).ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(ConfigError::NotFound(path));
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = read("MODEL_URL") {
            self.artifacts.model_url = Some(url);
        }
        if let Some(url) = read("SCALER_URL") {
            self.artifacts.scaler_url = Some(url);
        }
        if let Some(url) = read("FEATURES_URL") {
            self.artifacts.features_url = Some(url);
        }
        if let Some(dir) = read("CARDIO_ARTIFACT_DIR") {
            self.artifacts.dir = PathBuf::from(dir);
        }
        if let Some(secs) = read("CARDIO_FETCH_TIMEOUT_SECS") {
            self.artifacts.fetch_timeout_secs = secs.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "CARDIO_FETCH_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
        }
        if let Some(addr) = read("CARDIO_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(path) = read("CARDIO_DATASET") {
            self.training.dataset = PathBuf::from(path);
        }
        if let Some(flag) = read("SKIP_GRIDSEARCH") {
            self.training.skip_grid_search = flag == "1";
        }
        if let Some(flag) = read("SKIP_SHAP") {
            self.training.skip_explain = flag == "1";
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let artifacts = &self.artifacts;
        if artifacts.model_url.is_some() != artifacts.scaler_url.is_some() {
            return Err(ConfigError::Invalid(
                "MODEL_URL and SCALER_URL must be set together".to_string(),
            ));
        }
        if artifacts.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "artifacts.fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        let training = &self.training;
        if !(training.test_fraction > 0.0 && training.test_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "training.test_fraction must be in (0, 1), got {}",
                training.test_fraction
            )));
        }
        if training.cv_folds < 2 {
            return Err(ConfigError::Invalid(format!(
                "training.cv_folds must be at least 2, got {}",
                training.cv_folds
            )));
        }
        Ok(())
    }
}
