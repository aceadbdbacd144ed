//! End-to-end training run: CSV in, artifacts and report out.

use cardiorisk_config::CardioConfig;
use cardiorisk_model::{ModelArtifact, StandardScaler};
use chrono::Utc;
use tracing::info;

use crate::dataset::load_csv;
use crate::explain::mean_abs_attribution;
use crate::fit::{fit_logistic, predict_proba, FitParams};
use crate::metrics::{coefficient_importance, evaluate};
use crate::report::{Hyperparameters, TrainingReport};
use crate::search::grid_search;
use crate::split::stratified_split;

fn numeric_columns(rows: &[Vec<f64>], positions: &[usize]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| positions.iter().map(|&p| row[p]).collect())
        .collect()
}

fn scale_rows(scaler: &StandardScaler, rows: &mut [Vec<f64>], positions: &[usize]) -> anyhow::Result<()> {
    for row in rows.iter_mut() {
        scaler.transform_positions(row, positions)?;
    }
    Ok(())
}

pub fn run(config: &CardioConfig) -> anyhow::Result<TrainingReport> {
    let training = &config.training;
    let artifacts = &config.artifacts;

    let (dataset, stats) = load_csv(&training.dataset)?;
    if dataset.positives() == 0 || dataset.positives() == dataset.len() {
        anyhow::bail!("Dataset has a single class; cannot train a classifier");
    }

    let (train_idx, test_idx) = stratified_split(&dataset.labels, training.test_fraction, training.seed);
    let (mut train_x, train_y) = dataset.select(&train_idx);
    let (mut test_x, test_y) = dataset.select(&test_idx);
    info!(train = train_x.len(), test = test_x.len(), "Split dataset");

    // The scaler only sees numeric columns; dummy flags stay 0/1.
    let positions = dataset.order.numeric_positions();
    let scaler = StandardScaler::fit(&numeric_columns(&train_x, &positions))?;
    scale_rows(&scaler, &mut train_x, &positions)?;
    scale_rows(&scaler, &mut test_x, &positions)?;

    let (params, grid) = if training.skip_grid_search {
        info!("SKIP_GRIDSEARCH=1, using configured hyperparameters");
        let params = FitParams {
            epochs: training.epochs,
            learning_rate: training.learning_rate,
            weight_decay: training.weight_decay,
        };
        (params, None)
    } else {
        let candidates = grid_search(&train_x, &train_y, training.cv_folds, training.epochs, training.seed)?;
        let best = candidates
            .first()
            .ok_or_else(|| anyhow::anyhow!("Grid search produced no candidates"))?;
        let params = FitParams {
            epochs: training.epochs,
            learning_rate: best.learning_rate,
            weight_decay: best.weight_decay,
        };
        (params, Some(candidates))
    };

    let classifier = fit_logistic(&train_x, &train_y, params)?;
    let test = evaluate(&test_y, &predict_proba(&classifier, &test_x)?);
    info!(
        accuracy = test.accuracy,
        f1 = test.f1,
        roc_auc = ?test.roc_auc,
        "Test-set evaluation"
    );

    let features = dataset.order.names();
    let weights = classifier.weights()?;
    let coefficients = coefficient_importance(&features, &weights);
    let attribution = if training.skip_explain {
        info!("SKIP_SHAP=1, skipping attribution");
        None
    } else {
        Some(mean_abs_attribution(
            &features,
            &weights,
            &test_x,
            training.explain_samples,
            training.seed,
        ))
    };

    let artifact = ModelArtifact::new(dataset.order.clone(), scaler, classifier)?;
    artifact.save(
        &artifacts.model_path(),
        &artifacts.scaler_path(),
        &artifacts.features_path(),
    )?;
    info!(dir = %artifacts.dir.display(), "Saved model, scaler and feature order");

    let report = TrainingReport {
        trained_at: Utc::now(),
        dataset: training.dataset.display().to_string(),
        rows: stats,
        train_size: train_y.len(),
        test_size: test_y.len(),
        features,
        hyperparameters: Hyperparameters {
            epochs: params.epochs,
            learning_rate: params.learning_rate,
            weight_decay: params.weight_decay,
            searched: grid.is_some(),
        },
        grid_search: grid,
        test,
        coefficients,
        attribution,
    };
    report.write(&artifacts.report_path())?;
    Ok(report)
}
