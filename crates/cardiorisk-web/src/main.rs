//! Cardiorisk prediction server
//!
//! Run with: cargo run -p cardiorisk-web

use std::sync::Arc;

use cardiorisk_config::CardioConfig;
use cardiorisk_model::ArtifactStore;
use cardiorisk_web::{router::build_router, state::AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cardiorisk=debug,info")),
        )
        .init();

    info!("Starting cardiorisk prediction service v{}", env!("CARGO_PKG_VERSION"));

    let config = CardioConfig::load()?;
    let store = Arc::new(ArtifactStore::from_config(&config.artifacts)?);
    info!(
        remote = config.artifacts.is_remote(),
        timeout_secs = config.artifacts.fetch_timeout_secs,
        "Artifact source: {}",
        store.locations().model
    );

    if config.server.preload {
        if let Err(e) = store.get().await {
            warn!(error = %e, "Preload failed; serving anyway and retrying on first prediction");
        }
    }

    let app = build_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
