//! Axum router: maps URL paths to handlers.

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::handlers::{health::health, predict::predict};
use crate::state::{AppState, SharedState};

/// Any origin may call GET and POST with a JSON body. The layer answers every
/// OPTIONS request itself with an empty 200.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/",        get(health).post(predict))
        .route("/health",  get(health))
        .route("/predict", post(predict))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)

        // Middleware
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
