//! Lantern API - Counter Service
//!
//! An axum service exposing the counter's three server functions (read the
//! state, apply a delta, set the step) over a `CounterStore`, plus health
//! probes and an OpenAPI document.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
