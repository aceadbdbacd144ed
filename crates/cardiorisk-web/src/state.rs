//! Shared application state for the web server.

use std::sync::Arc;

use cardiorisk_model::ArtifactStore;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Loaded lazily on the first prediction, or at startup when preloading.
    pub store: Arc<ArtifactStore>,
}

impl AppState {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }
}

pub type SharedState = Arc<AppState>;
