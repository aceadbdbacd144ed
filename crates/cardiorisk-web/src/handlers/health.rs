//! Liveness probe.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::SharedState;

pub const SERVICE_NAME: &str = "cardiorisk";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub model_loaded: bool,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET / and GET /health. Reports artifact state without loading anything.
pub async fn health(State(state): State<SharedState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        model_loaded: state.store.is_loaded(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}
