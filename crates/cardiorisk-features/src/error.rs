//! Error types for the feature transform.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Raised when a patient record cannot be turned into features.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field {field}: expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Field {field} out of range: {value} is not within [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Field {field} has unsupported value {value} (allowed: {allowed})")]
    InvalidCategory {
        field: &'static str,
        value: i64,
        allowed: &'static str,
    },

    #[error("Derived feature {0} is not a finite positive number")]
    NonFiniteFeature(&'static str),
}

impl ValidationError {
    /// Name of the offending input field, when the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField(field)
            | ValidationError::InvalidType { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidCategory { field, .. } => Some(field),
            ValidationError::NotAnObject | ValidationError::NonFiniteFeature(_) => None,
        }
    }
}

/// Raised when a persisted feature order cannot be used.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Feature order is empty")]
    Empty,

    #[error("Unknown feature column: {0}")]
    UnknownColumn(String),

    #[error("Duplicate feature column: {0}")]
    DuplicateColumn(String),

    #[error("Feature order JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
