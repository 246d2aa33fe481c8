//! Route modules and the top-level router.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::ApiConfig, openapi::ApiDoc, state::AppState};

pub mod counter;
pub mod health;

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Build the complete router: counter routes under `/api/v1`, health checks
/// under `/health`, the OpenAPI document, request tracing and CORS.
pub fn create_router(state: AppState, config: &ApiConfig) -> Router {
    Router::new()
        .nest("/api/v1", counter::create_router())
        .nest("/health", health::create_router())
        .route("/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(config)),
        )
        .with_state(state)
}

/// In development mode (empty origins) any origin is allowed.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricted origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    }
}
