//! Per-feature attribution for the linear model.
//!
//! For `f(x) = w·x + b` the Shapley value of feature `j` relative to a
//! background mean `m` is exactly `w_j * (x_j - m_j)` in logit space, so no
//! sampling-based explainer is needed.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    pub feature: &'static str,
    pub mean_abs: f64,
}

/// Mean |attribution| per feature over up to `max_samples` randomly chosen
/// rows, ranked highest first. The background is the mean of those rows.
pub fn mean_abs_attribution(
    features: &[&'static str],
    weights: &[f32],
    rows: &[Vec<f64>],
    max_samples: usize,
    seed: u64,
) -> Vec<Attribution> {
    if rows.is_empty() || max_samples == 0 {
        return Vec::new();
    }

    let sample: Vec<&Vec<f64>> = if rows.len() > max_samples {
        let mut rng = StdRng::seed_from_u64(seed);
        index::sample(&mut rng, rows.len(), max_samples)
            .into_iter()
            .map(|i| &rows[i])
            .collect()
    } else {
        rows.iter().collect()
    };
    info!(samples = sample.len(), of = rows.len(), "Computing feature attributions (set SKIP_SHAP=1 to skip)");

    let n = sample.len() as f64;
    let width = features.len().min(weights.len());
    let mut ranked: Vec<Attribution> = (0..width)
        .map(|j| {
            let mean = sample.iter().map(|row| row[j]).sum::<f64>() / n;
            let w = f64::from(weights[j]);
            let mean_abs = sample.iter().map(|row| (w * (row[j] - mean)).abs()).sum::<f64>() / n;
            Attribution { feature: features[j], mean_abs }
        })
        .collect();

    ranked.sort_by(|a, b| b.mean_abs.partial_cmp(&a.mean_abs).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}
