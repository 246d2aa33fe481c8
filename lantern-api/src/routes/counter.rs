//! Counter REST API Routes
//!
//! The dashboard's counter page calls these three server functions. State is
//! one shared `{count, step}` pair with last-writer-wins semantics.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lantern_core::CounterState;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeltaRequest {
    /// Signed amount added to the count.
    pub delta: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StepRequest {
    /// New step; must be at least 1.
    pub step: i64,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/counter - Read the persisted pair
#[utoipa::path(
    get,
    path = "/api/v1/counter",
    tag = "Counter",
    responses(
        (status = 200, description = "Current counter state", body = CounterState),
        (status = 500, description = "Storage failure", body = ApiError),
    ),
)]
pub async fn get_counter(State(state): State<AppState>) -> ApiResult<Json<CounterState>> {
    let counter = state.store.read_state().await?;
    Ok(Json(counter))
}

/// POST /api/v1/counter/delta - Add a signed delta to the count
#[utoipa::path(
    post,
    path = "/api/v1/counter/delta",
    tag = "Counter",
    request_body = DeltaRequest,
    responses(
        (status = 204, description = "Delta applied"),
        (status = 400, description = "Count would overflow", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError),
    ),
)]
pub async fn apply_delta(
    State(state): State<AppState>,
    Json(req): Json<DeltaRequest>,
) -> ApiResult<StatusCode> {
    state.store.apply_delta(req.delta).await?;
    tracing::debug!(delta = req.delta, "counter delta applied");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/counter/step - Replace the step
#[utoipa::path(
    put,
    path = "/api/v1/counter/step",
    tag = "Counter",
    request_body = StepRequest,
    responses(
        (status = 204, description = "Step stored"),
        (status = 400, description = "Step below 1", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError),
    ),
)]
pub async fn set_step(
    State(state): State<AppState>,
    Json(req): Json<StepRequest>,
) -> ApiResult<StatusCode> {
    state.store.set_step(req.step).await?;
    tracing::debug!(step = req.step, "counter step stored");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/counter", get(get_counter))
        .route("/counter/delta", post(apply_delta))
        .route("/counter/step", put(set_step))
}
