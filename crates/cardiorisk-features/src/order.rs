//! Persisted training-time column order (`features.json`).
//!
//! Training writes the order it fitted on; serving reads it back and lays
//! out every feature vector accordingly, so a retrain with a different
//! column set cannot silently skew predictions.

use std::collections::HashSet;

use crate::columns::Column;
use crate::error::OrderError;
use crate::transform::FeatureVector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureOrder {
    columns: Vec<Column>,
}

impl FeatureOrder {
    /// The order produced by the current training pipeline.
    pub fn canonical() -> Self {
        Self { columns: Column::ALL.to_vec() }
    }

    /// Build an order from column names, rejecting unknown or repeated names.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, OrderError> {
        if names.is_empty() {
            return Err(OrderError::Empty);
        }

        let mut seen = HashSet::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let column = Column::from_name(name)
                .ok_or_else(|| OrderError::UnknownColumn(name.to_string()))?;
            if !seen.insert(column) {
                return Err(OrderError::DuplicateColumn(name.to_string()));
            }
            columns.push(column);
        }
        Ok(Self { columns })
    }

    /// Parse a JSON array of column names.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, OrderError> {
        let names: Vec<String> = serde_json::from_slice(bytes)?;
        Self::from_names(&names)
    }

    pub fn to_json_pretty(&self) -> Result<String, OrderError> {
        Ok(serde_json::to_string_pretty(&self.names())?)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Lay out a feature vector in this order.
    pub fn arrange(&self, features: &FeatureVector) -> Vec<f64> {
        self.columns.iter().map(|&c| features.get(c)).collect()
    }

    /// Positions (within this order) of the columns the scaler covers.
    pub fn numeric_positions(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_numeric())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn numeric_len(&self) -> usize {
        self.columns.iter().filter(|c| c.is_numeric()).count()
    }
}
