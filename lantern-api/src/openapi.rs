//! OpenAPI document for the counter service.

use lantern_core::CounterState;
use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{counter, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lantern API",
        version = "0.1.0",
        description = "Persisted counter behind the lantern dashboard",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Counter", description = "Shared count and step pair"),
        (name = "Health", description = "Liveness probes")
    ),
    paths(
        counter::get_counter,
        counter::apply_delta,
        counter::set_step,
        health::ping,
        health::liveness,
    ),
    components(schemas(
        CounterState,
        counter::DeltaRequest,
        counter::StepRequest,
        health::HealthResponse,
        health::HealthStatus,
        ApiError,
        ErrorCode,
    ))
)]
pub struct ApiDoc;
