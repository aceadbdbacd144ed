//! Where the artifacts come from: local files or HTTP(S) URLs.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use cardiorisk_config::ArtifactConfig;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::artifact::ModelArtifact;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Path(PathBuf),
    Url(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocations {
    pub model: Location,
    pub scaler: Location,
    pub features: Location,
}

impl ArtifactLocations {
    /// URLs win over the artifact directory; `features.json` falls back to
    /// the local copy when no FEATURES_URL is configured.
    pub fn from_config(config: &ArtifactConfig) -> Self {
        let pick = |url: &Option<String>, path: PathBuf| match url {
            Some(url) => Location::Url(url.clone()),
            None => Location::Path(path),
        };
        Self {
            model: pick(&config.model_url, config.model_path()),
            scaler: pick(&config.scaler_url, config.scaler_path()),
            features: pick(&config.features_url, config.features_path()),
        }
    }

    pub fn local(model: impl Into<PathBuf>, scaler: impl Into<PathBuf>, features: impl Into<PathBuf>) -> Self {
        Self {
            model: Location::Path(model.into()),
            scaler: Location::Path(scaler.into()),
            features: Location::Path(features.into()),
        }
    }
}

/// Reads artifact bytes. Every HTTP request is bounded by the configured
/// timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cardiorisk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ModelError::artifact_load("http client", e))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, location), fields(source = %location))]
    pub async fn fetch(&self, artifact: &'static str, location: &Location) -> Result<Vec<u8>> {
        match location {
            Location::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                ModelError::artifact_load(artifact, format!("{}: {}", path.display(), e))
            }),
            Location::Url(url) => {
                let resp = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| ModelError::artifact_load(artifact, describe(&e, self.timeout)))?;

                if !resp.status().is_success() {
                    return Err(ModelError::artifact_load(
                        artifact,
                        format!("GET {} returned HTTP {}", url, resp.status()),
                    ));
                }
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|e| ModelError::artifact_load(artifact, describe(&e, self.timeout)))?;
                debug!(bytes = bytes.len(), "Downloaded artifact");
                Ok(bytes.to_vec())
            }
        }
    }

    /// Fetch all three artifacts concurrently and assemble them.
    pub async fn load(&self, locations: &ArtifactLocations) -> Result<ModelArtifact> {
        let (model, scaler, features) = tokio::try_join!(
            self.fetch("model", &locations.model),
            self.fetch("scaler", &locations.scaler),
            self.fetch("features", &locations.features),
        )?;
        let artifact = ModelArtifact::from_bytes(&model, &scaler, &features)?;
        info!(
            model = %locations.model,
            features = artifact.order().len(),
            numeric = artifact.scaler().width(),
            "Loaded model artifacts"
        );
        Ok(artifact)
    }
}

fn describe(err: &reqwest::Error, timeout: Duration) -> String {
    if err.is_timeout() {
        format!("timed out after {:?}", timeout)
    } else {
        err.to_string()
    }
}
