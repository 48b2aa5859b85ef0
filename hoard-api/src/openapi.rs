//! OpenAPI Specification for HOARD API
//!
//! Generated by utoipa from the route annotations and schema derives, and
//! served at `/openapi.json`.

use axum::Json;
use hoard_core::Person;
use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, person, HealthResponse, HealthStatus, StoreResponse};

/// OpenAPI document for HOARD API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "HOARD API",
        version = "0.1.0",
        description = "Content-addressed cache for person records",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local Development")
    ),
    tags(
        (name = "Person", description = "Store and retrieve person records by content hash"),
        (name = "Health", description = "Liveness probes")
    ),
    paths(
        person::store_person,
        person::retrieve_person,
        person::retrieve_person_by_query,
        health::ping,
        health::liveness,
    ),
    components(schemas(
        Person,
        StoreResponse,
        ApiError,
        ErrorCode,
        HealthResponse,
        HealthStatus,
    ))
)]
pub struct ApiDoc;

/// GET /openapi.json - OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
