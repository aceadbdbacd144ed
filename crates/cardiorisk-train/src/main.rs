//! Cardiorisk training binary
//!
//! Run with: cargo run -p cardiorisk-train --release
//! Set SKIP_GRIDSEARCH=1 and/or SKIP_SHAP=1 for a quick run.

use cardiorisk_config::CardioConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cardiorisk=debug,info")),
        )
        .init();

    let config = CardioConfig::load()?;
    info!(
        dataset = %config.training.dataset.display(),
        skip_grid_search = config.training.skip_grid_search,
        skip_explain = config.training.skip_explain,
        "Starting training run"
    );

    let report = cardiorisk_train::run(&config)?;

    info!(
        accuracy = report.test.accuracy,
        precision = report.test.precision,
        recall = report.test.recall,
        f1 = report.test.f1,
        "Training complete"
    );
    for top in report.coefficients.iter().take(5) {
        info!(feature = top.feature, weight = top.weight, "Top coefficient");
    }
    info!(report = %config.artifacts.report_path().display(), "Report written");
    Ok(())
}
