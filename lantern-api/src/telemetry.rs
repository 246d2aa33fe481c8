//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_FILTER: &str = "lantern_api=debug,tower_http=debug,info";

/// Install the global subscriber: `RUST_LOG` (or [`DEFAULT_FILTER`]) and
/// JSON lines on stdout. Call once at startup.
pub fn init_tracing() -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Telemetry initialized");
    Ok(())
}
