//! Hyper-parameter grid search with stratified k-fold cross-validation,
//! scored by F1.

use serde::Serialize;
use tracing::{debug, info};

use crate::fit::{fit_logistic, predict_proba, FitParams};
use crate::metrics::{threshold, ConfusionMatrix};
use crate::split::{complement, stratified_folds};

pub const LEARNING_RATES: [f64; 3] = [0.01, 0.05, 0.1];
pub const WEIGHT_DECAYS: [f64; 3] = [0.0, 0.001, 0.01];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub fold_f1: Vec<f64>,
    pub mean_f1: f64,
}

fn select(rows: &[Vec<f64>], labels: &[u8], indices: &[usize]) -> (Vec<Vec<f64>>, Vec<u8>) {
    (
        indices.iter().map(|&i| rows[i].clone()).collect(),
        indices.iter().map(|&i| labels[i]).collect(),
    )
}

/// Mean held-out F1 of `params` over `folds`.
pub fn cross_validate(
    rows: &[Vec<f64>],
    labels: &[u8],
    folds: &[Vec<usize>],
    params: FitParams,
) -> anyhow::Result<Vec<f64>> {
    let mut scores = Vec::with_capacity(folds.len());
    for (k, fold) in folds.iter().enumerate() {
        let (train_x, train_y) = select(rows, labels, &complement(folds, k));
        let (val_x, val_y) = select(rows, labels, fold);

        let clf = fit_logistic(&train_x, &train_y, params)?;
        let predicted = threshold(&predict_proba(&clf, &val_x)?);
        scores.push(ConfusionMatrix::from_predictions(&val_y, &predicted).f1());
    }
    Ok(scores)
}

/// Score every learning-rate / weight-decay pair. Candidates come back
/// best first; ties keep grid order.
pub fn grid_search(
    rows: &[Vec<f64>],
    labels: &[u8],
    cv_folds: usize,
    epochs: usize,
    seed: u64,
) -> anyhow::Result<Vec<Candidate>> {
    let folds = stratified_folds(labels, cv_folds, seed);
    info!(
        candidates = LEARNING_RATES.len() * WEIGHT_DECAYS.len(),
        folds = folds.len(),
        "Starting grid search (set SKIP_GRIDSEARCH=1 to skip)"
    );

    let mut candidates = Vec::new();
    for &learning_rate in &LEARNING_RATES {
        for &weight_decay in &WEIGHT_DECAYS {
            let params = FitParams { epochs, learning_rate, weight_decay };
            let fold_f1 = cross_validate(rows, labels, &folds, params)?;
            let mean_f1 = fold_f1.iter().sum::<f64>() / fold_f1.len() as f64;
            debug!(learning_rate, weight_decay, mean_f1, "Scored candidate");
            candidates.push(Candidate { learning_rate, weight_decay, fold_f1, mean_f1 });
        }
    }

    candidates.sort_by(|a, b| {
        b.mean_f1
            .partial_cmp(&a.mean_f1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(best) = candidates.first() {
        info!(
            learning_rate = best.learning_rate,
            weight_decay = best.weight_decay,
            mean_f1 = best.mean_f1,
            "Grid search best"
        );
    }
    Ok(candidates)
}
