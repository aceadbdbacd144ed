//! Process-wide, load-once holder for the [`ModelArtifact`].
//!
//! Concurrent first callers share a single load. A failed load leaves the
//! store empty so a later call retries; a successful one is never repeated.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cardiorisk_config::ArtifactConfig;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::artifact::ModelArtifact;
use crate::error::Result;
use crate::source::{ArtifactLocations, Fetcher};

pub struct ArtifactStore {
    locations: ArtifactLocations,
    fetcher: Fetcher,
    cell: OnceCell<Arc<ModelArtifact>>,
    attempts: AtomicUsize,
}

impl ArtifactStore {
    pub fn new(locations: ArtifactLocations, fetcher: Fetcher) -> Self {
        Self {
            locations,
            fetcher,
            cell: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &ArtifactConfig) -> Result<Self> {
        let fetcher = Fetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
        Ok(Self::new(ArtifactLocations::from_config(config), fetcher))
    }

    /// A store that already holds `artifact` and never touches its sources.
    pub fn with_artifact(locations: ArtifactLocations, fetcher: Fetcher, artifact: ModelArtifact) -> Self {
        Self {
            locations,
            fetcher,
            cell: OnceCell::new_with(Some(Arc::new(artifact))),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Return the loaded artifact, loading it first if needed.
    pub async fn get(&self) -> Result<Arc<ModelArtifact>> {
        let artifact = self
            .cell
            .get_or_try_init(|| async {
                let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                info!(attempt, model = %self.locations.model, "Loading model artifacts");
                match self.fetcher.load(&self.locations).await {
                    Ok(artifact) => Ok(Arc::new(artifact)),
                    Err(e) => {
                        warn!(attempt, error = %e, "Artifact load failed; will retry on next request");
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(artifact))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// The artifact if it has already been loaded. Never triggers a load.
    pub fn loaded(&self) -> Option<Arc<ModelArtifact>> {
        self.cell.get().cloned()
    }

    /// How many loads have been started so far.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn locations(&self) -> &ArtifactLocations {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogisticClassifier, ModelError, StandardScaler};
    use cardiorisk_features::FeatureOrder;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cardio-store-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn artifact() -> ModelArtifact {
        let order = FeatureOrder::canonical();
        let n = order.numeric_len();
        let scaler = StandardScaler::new(vec![0.0; n], vec![1.0; n]).unwrap();
        let clf = LogisticClassifier::from_weights(&vec![0.1; order.len()], 0.0).unwrap();
        ModelArtifact::new(order, scaler, clf).unwrap()
    }

    fn store_for(dir: &PathBuf) -> ArtifactStore {
        let locations = ArtifactLocations::local(
            dir.join("model.safetensors"),
            dir.join("scaler.safetensors"),
            dir.join("features.json"),
        );
        ArtifactStore::new(locations, Fetcher::new(Duration::from_secs(1)).unwrap())
    }

    fn write_artifacts(dir: &PathBuf) {
        artifact()
            .save(
                &dir.join("model.safetensors"),
                &dir.join("scaler.safetensors"),
                &dir.join("features.json"),
            )
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let dir = temp_dir();
        let store = store_for(&dir);

        let err = store.get().await.unwrap_err();
        assert!(matches!(err, ModelError::ArtifactLoad { .. }));
        assert!(!store.is_loaded());
        assert_eq!(store.load_attempts(), 1);

        write_artifacts(&dir);
        let first = store.get().await.unwrap();
        assert!(store.is_loaded());
        assert_eq!(store.load_attempts(), 2);

        // Later calls reuse the same instance
        std::fs::remove_dir_all(&dir).unwrap();
        let again = store.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(store.load_attempts(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_load_once() {
        let dir = temp_dir();
        write_artifacts(&dir);
        let store = Arc::new(store_for(&dir));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.get().await.map(|_| ()) })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.load_attempts(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_preloaded_store_skips_sources() {
        let locations = ArtifactLocations::local("/nonexistent/m", "/nonexistent/s", "/nonexistent/f");
        let store = ArtifactStore::with_artifact(
            locations,
            Fetcher::new(Duration::from_secs(1)).unwrap(),
            artifact(),
        );
        assert!(store.is_loaded());
        assert!(store.loaded().is_some());
        store.get().await.unwrap();
        assert_eq!(store.load_attempts(), 0);
    }
}
