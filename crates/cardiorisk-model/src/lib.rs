//! cardiorisk-model: fitted artifacts and the prediction pipeline.
//!
//! A [`ModelArtifact`] bundles the persisted feature order, the standard
//! scaler (numeric columns only) and the logistic classifier. The
//! [`ArtifactStore`] acquires it from local files or URLs exactly once per
//! process and hands out shared read-only references.

pub mod artifact;
pub mod classifier;
pub mod error;
pub mod scaler;
pub mod source;
pub mod store;

pub use artifact::{ModelArtifact, Prediction, PreparedFeatures, DECISION_THRESHOLD};
pub use classifier::LogisticClassifier;
pub use error::{ModelError, Result};
pub use scaler::StandardScaler;
pub use source::{ArtifactLocations, Fetcher, Location};
pub use store::ArtifactStore;
