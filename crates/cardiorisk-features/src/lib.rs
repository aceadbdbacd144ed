//! cardiorisk-features: the feature transform shared by training and serving.
//!
//! Maps a raw [`PatientRecord`] to the 18-column [`FeatureVector`] the scaler
//! and classifier were fitted on. Both the training binary and the HTTP
//! service call [`encode`], so the two paths cannot drift apart.
//!
//! # Example
//! ```rust
//! use cardiorisk_features::{encode, Column, PatientRecord};
//!
//! let record = PatientRecord::from_json(&serde_json::json!({
//!     "age": 45, "gender": 2, "height": 170, "weight": 72.5,
//!     "ap_hi": 130, "ap_lo": 85, "cholesterol": 2, "gluc": 1,
//!     "smoke": 0, "alco": 0, "active": 1
//! })).unwrap();
//!
//! let features = encode(&record).unwrap();
//! assert_eq!(features.get(Column::AgeCat45To60), 1.0);
//! ```

pub mod columns;
pub mod error;
pub mod order;
pub mod patient;
pub mod transform;

pub use columns::{Column, ColumnKind};
pub use error::{OrderError, Result, ValidationError};
pub use order::FeatureOrder;
pub use patient::{Gender, Level, PatientRecord};
pub use transform::{bmi, encode, FeatureVector};
