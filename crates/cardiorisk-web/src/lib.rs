//! cardiorisk-web: HTTP surface of the prediction service.
//!
//! Routes:
//!   GET  /, /health   liveness and artifact state
//!   POST /predict     score one patient record (`POST /` is an alias)
//!   OPTIONS on each   CORS preflight

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
