//! Logistic-regression classifier on top of a candle `Linear` layer.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::Linear;

use crate::error::{ModelError, Result};

pub const WEIGHT_TENSOR: &str = "weight";
pub const BIAS_TENSOR: &str = "bias";

const ARTIFACT: &str = "model";

/// Binary classifier: `P(cardio = 1) = sigmoid(w·x + b)`.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    linear: Linear,
    n_features: usize,
}

impl LogisticClassifier {
    /// Wrap a `(1, n)` weight row and a `(1,)` bias.
    pub fn new(weight: Tensor, bias: Tensor) -> Result<Self> {
        let n_features = match weight.dims() {
            [1, n] if *n > 0 => *n,
            dims => {
                return Err(ModelError::artifact_load(
                    ARTIFACT,
                    format!("weight must have shape (1, n), got {:?}", dims),
                ))
            }
        };
        if bias.elem_count() != 1 {
            return Err(ModelError::artifact_load(
                ARTIFACT,
                format!("bias must hold one value, got shape {:?}", bias.dims()),
            ));
        }
        let weight = weight.to_dtype(DType::F32)?;
        let bias = bias.to_dtype(DType::F32)?.reshape(1)?;
        Ok(Self {
            linear: Linear::new(weight, Some(bias)),
            n_features,
        })
    }

    pub fn from_weights(weights: &[f32], bias: f32) -> Result<Self> {
        let device = Device::Cpu;
        let weight = Tensor::from_slice(weights, (1, weights.len()), &device)?;
        let bias = Tensor::new(&[bias], &device)?;
        Self::new(weight, bias)
    }

    /// Adopt a layer trained elsewhere (e.g. through a `VarMap`).
    pub fn from_linear(linear: Linear) -> Result<Self> {
        let bias = match linear.bias() {
            Some(bias) => bias.clone(),
            None => Tensor::zeros(1, DType::F32, linear.weight().device())?,
        };
        Self::new(linear.weight().clone(), bias)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn weights(&self) -> Result<Vec<f32>> {
        Ok(self.linear.weight().flatten_all()?.to_vec1::<f32>()?)
    }

    pub fn bias(&self) -> Result<f32> {
        match self.linear.bias() {
            Some(bias) => Ok(bias.flatten_all()?.to_vec1::<f32>()?[0]),
            None => Ok(0.0),
        }
    }

    /// Raw scores `w·x + b` for a `(batch, n_features)` input.
    pub fn logits(&self, rows: &Tensor) -> Result<Tensor> {
        match rows.dims() {
            [_, n] if *n == self.n_features => {}
            dims => {
                return Err(ModelError::Prediction(format!(
                    "classifier expects (batch, {}), got {:?}",
                    self.n_features, dims
                )))
            }
        }
        Ok(self.linear.forward(&rows.to_dtype(DType::F32)?)?)
    }

    /// Positive-class probability for each row.
    pub fn predict_proba(&self, rows: &Tensor) -> Result<Vec<f32>> {
        let logits = self.logits(rows)?;
        let proba = candle_nn::ops::sigmoid(&logits)?;
        Ok(proba.flatten_all()?.to_vec1::<f32>()?)
    }

    /// Persist as a safetensors file with `weight` and `bias` tensors.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut tensors = HashMap::new();
        tensors.insert(WEIGHT_TENSOR, self.linear.weight().clone());
        let bias = match self.linear.bias() {
            Some(bias) => bias.clone(),
            None => Tensor::zeros(1, DType::F32, &Device::Cpu)?,
        };
        tensors.insert(BIAS_TENSOR, bias);
        candle_core::safetensors::save(&tensors, path)?;
        Ok(())
    }

    pub fn from_safetensors_bytes(bytes: &[u8]) -> Result<Self> {
        let mut tensors = candle_core::safetensors::load_buffer(bytes, &Device::Cpu)
            .map_err(|e| ModelError::artifact_load(ARTIFACT, e))?;
        let mut take = |name: &str| {
            tensors
                .remove(name)
                .ok_or_else(|| ModelError::artifact_load(ARTIFACT, format!("missing tensor '{}'", name)))
        };
        let weight = take(WEIGHT_TENSOR)?;
        let bias = take(BIAS_TENSOR)?;
        Self::new(weight, bias).map_err(|e| match e {
            ModelError::Tensor(e) => ModelError::artifact_load(ARTIFACT, e),
            other => other,
        })
    }
}
