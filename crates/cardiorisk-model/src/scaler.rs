//! Per-column standardisation, fitted on the numeric columns only.
//!
//! Uses population variance and maps (near-)zero spreads to 1.0 so a
//! constant column passes through centred but unscaled.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};

use crate::error::{ModelError, Result};

pub const MEAN_TENSOR: &str = "mean";
pub const SCALE_TENSOR: &str = "scale";

const ARTIFACT: &str = "scaler";

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.is_empty() || mean.len() != scale.len() {
            return Err(ModelError::artifact_load(
                ARTIFACT,
                format!("mean has {} entries, scale has {}", mean.len(), scale.len()),
            ));
        }
        if mean.iter().any(|m| !m.is_finite()) || scale.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(ModelError::artifact_load(
                ARTIFACT,
                "mean and scale must be finite and scale strictly positive",
            ));
        }
        Ok(Self { mean, scale })
    }

    /// Fit on row-major training data (one inner vec per sample).
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(ModelError::Fit("cannot fit a scaler on an empty matrix".to_string()));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(ModelError::Fit(format!(
                "row {} has {} columns, expected {}",
                bad,
                rows[bad].len(),
                width
            )));
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let x = Tensor::from_vec(flat, (rows.len(), width), &Device::Cpu)?;
        let mean = x.mean_keepdim(0)?;
        let var = x.broadcast_sub(&mean)?.sqr()?.mean_keepdim(0)?;

        let mean = mean.squeeze(0)?.to_vec1::<f64>()?;
        let scale = var
            .squeeze(0)?
            .sqrt()?
            .to_vec1::<f64>()?
            .into_iter()
            .map(|s| if s < 10.0 * f64::EPSILON { 1.0 } else { s })
            .collect();
        Self::new(mean, scale)
    }

    /// Number of columns the scaler was fitted on.
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Standardise `row[positions[k]]` with the k-th fitted column, leaving
    /// every other position untouched.
    pub fn transform_positions(&self, row: &mut [f64], positions: &[usize]) -> Result<()> {
        if positions.len() != self.width() {
            return Err(ModelError::Prediction(format!(
                "scaler expects {} columns, got {}",
                self.width(),
                positions.len()
            )));
        }
        let len = row.len();
        for (k, &pos) in positions.iter().enumerate() {
            let value = row.get_mut(pos).ok_or_else(|| {
                ModelError::Prediction(format!("position {} outside a row of {}", pos, len))
            })?;
            *value = (*value - self.mean[k]) / self.scale[k];
        }
        Ok(())
    }

    /// Persist as a safetensors file with `mean` and `scale` f64 tensors.
    pub fn save(&self, path: &Path) -> Result<()> {
        let device = Device::Cpu;
        let mut tensors = HashMap::new();
        tensors.insert(MEAN_TENSOR, Tensor::new(self.mean.as_slice(), &device)?);
        tensors.insert(SCALE_TENSOR, Tensor::new(self.scale.as_slice(), &device)?);
        candle_core::safetensors::save(&tensors, path)?;
        Ok(())
    }

    pub fn from_safetensors_bytes(bytes: &[u8]) -> Result<Self> {
        let tensors = candle_core::safetensors::load_buffer(bytes, &Device::Cpu)
            .map_err(|e| ModelError::artifact_load(ARTIFACT, e))?;
        let read = |name: &str| -> Result<Vec<f64>> {
            tensors
                .get(name)
                .ok_or_else(|| ModelError::artifact_load(ARTIFACT, format!("missing tensor '{}'", name)))?
                .flatten_all()
                .and_then(|t| t.to_dtype(DType::F64))
                .and_then(|t| t.to_vec1::<f64>())
                .map_err(|e| ModelError::artifact_load(ARTIFACT, e))
        };
        Self::new(read(MEAN_TENSOR)?, read(SCALE_TENSOR)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_population_variance() {
        let rows = vec![vec![1.0, 10.0, 0.0], vec![3.0, 10.0, 4.0], vec![5.0, 10.0, 8.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();

        assert_eq!(scaler.mean(), &[3.0, 10.0, 4.0]);
        // var([1,3,5]) = 8/3; constant column gets scale 1
        assert!((scaler.scale()[0] - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(scaler.scale()[1], 1.0);
        assert!((scaler.scale()[2] - (32.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(StandardScaler::fit(&rows), Err(ModelError::Fit(_))));
        assert!(matches!(StandardScaler::fit(&[]), Err(ModelError::Fit(_))));
    }

    #[test]
    fn test_transform_positions_leaves_others() {
        let scaler = StandardScaler::new(vec![160.0, 0.5], vec![10.0, 0.5]).unwrap();
        let mut row = vec![170.0, 7.0, 1.0, 1.0];
        scaler.transform_positions(&mut row, &[0, 2]).unwrap();
        assert_eq!(row, vec![1.0, 7.0, 1.0, 1.0]);
    }

    #[test]
    fn test_transform_width_mismatch() {
        let scaler = StandardScaler::new(vec![0.0; 11], vec![1.0; 11]).unwrap();
        let mut row = vec![0.0; 18];
        let all: Vec<usize> = (0..18).collect();
        assert!(matches!(
            scaler.transform_positions(&mut row, &all),
            Err(ModelError::Prediction(_))
        ));
    }

    #[test]
    fn test_new_rejects_bad_scale() {
        assert!(StandardScaler::new(vec![0.0], vec![0.0]).is_err());
        assert!(StandardScaler::new(vec![f64::NAN], vec![1.0]).is_err());
        assert!(StandardScaler::new(vec![0.0, 1.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_safetensors_round_trip() {
        let scaler = StandardScaler::new(vec![164.4, 74.1, 126.7], vec![8.2, 14.3, 16.9]).unwrap();
        let path = std::env::temp_dir().join(format!("scaler-{}.safetensors", uuid::Uuid::new_v4()));
        scaler.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let loaded = StandardScaler::from_safetensors_bytes(&bytes).unwrap();
        assert_eq!(loaded, scaler);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = StandardScaler::from_safetensors_bytes(b"not a safetensors file").unwrap_err();
        assert!(matches!(err, ModelError::ArtifactLoad { artifact: "scaler", .. }));
    }
}
