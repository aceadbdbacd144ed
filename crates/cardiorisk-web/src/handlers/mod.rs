//! HTTP handlers for all routes.

pub mod health;
pub mod predict;
