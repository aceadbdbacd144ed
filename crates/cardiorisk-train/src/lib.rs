//! cardiorisk-train: fits the scaler and classifier served by cardiorisk-web.
//!
//! Pipeline: load CSV → clean → encode (same transform as serving) →
//! stratified split → scale numeric columns → optional grid search →
//! fit → evaluate → optional attribution → persist artifacts and report.

pub mod dataset;
pub mod explain;
pub mod fit;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod split;

pub use pipeline::run;
pub use report::TrainingReport;
