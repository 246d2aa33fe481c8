//! Lantern API Server Entry Point

use std::sync::Arc;

use lantern_api::{create_router, telemetry::init_tracing, ApiConfig, ApiError, ApiResult, AppState};
use lantern_storage::FileCounterStore;

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing()?;

    let config = ApiConfig::from_env()?;
    let store = FileCounterStore::new(config.counter_dir.clone());
    let app = create_router(AppState::new(Arc::new(store)), &config);

    let addr = config.socket_addr()?;
    tracing::info!(%addr, counter_dir = %config.counter_dir.display(), "Starting lantern API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
