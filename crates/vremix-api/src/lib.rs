//! Axum HTTP API server.
//!
//! This crate provides:
//! - `POST /upload`: store, validate and transform an uploaded video
//! - `GET /download/{filename}` and `DELETE /cleanup/{filename}` over the output store
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use store::FileStore;
