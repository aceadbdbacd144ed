//! Full-batch logistic-regression fitting with candle-nn.

use candle_core::{DType, Device, Tensor};
use candle_nn::{loss, AdamW, Init, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use cardiorisk_model::LogisticClassifier;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub epochs: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
}

/// Row-major `f64` samples as an `(n, width)` f32 tensor.
pub fn to_tensor(rows: &[Vec<f64>], device: &Device) -> anyhow::Result<Tensor> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    let flat: Vec<f32> = rows.iter().flatten().map(|&v| v as f32).collect();
    Ok(Tensor::from_vec(flat, (rows.len(), width), device)?)
}

/// Minimise binary cross-entropy with AdamW. Weights start at zero, so the
/// result depends only on the data and `params`.
pub fn fit_logistic(rows: &[Vec<f64>], labels: &[u8], params: FitParams) -> anyhow::Result<LogisticClassifier> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if width == 0 || rows.len() != labels.len() {
        anyhow::bail!(
            "Cannot fit on {} rows of width {} with {} labels",
            rows.len(),
            width,
            labels.len()
        );
    }

    let device = Device::Cpu;
    let xs = to_tensor(rows, &device)?;
    let targets: Vec<f32> = labels.iter().map(|&y| f32::from(y)).collect();
    let ys = Tensor::from_vec(targets, labels.len(), &device)?;

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let weight = vb.get_with_hints((1, width), "weight", Init::Const(0.0))?;
    let bias = vb.get_with_hints(1, "bias", Init::Const(0.0))?;
    let linear = Linear::new(weight, Some(bias));

    let mut optimizer = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: params.learning_rate,
            weight_decay: params.weight_decay,
            ..Default::default()
        },
    )?;

    for epoch in 0..params.epochs {
        let logits = linear.forward(&xs)?.squeeze(1)?;
        let loss = loss::binary_cross_entropy_with_logit(&logits, &ys)?;
        optimizer.backward_step(&loss)?;
        if epoch % 100 == 0 || epoch + 1 == params.epochs {
            debug!(epoch, loss = loss.to_scalar::<f32>()?, "Training step");
        }
    }

    Ok(LogisticClassifier::from_linear(linear)?)
}

/// Positive-class probabilities for already scaled rows.
pub fn predict_proba(classifier: &LogisticClassifier, rows: &[Vec<f64>]) -> anyhow::Result<Vec<f64>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let xs = to_tensor(rows, &Device::Cpu)?;
    Ok(classifier
        .predict_proba(&xs)?
        .into_iter()
        .map(f64::from)
        .collect())
}
