//! Person REST API Routes
//!
//! - `POST /person/populate/` stores a person and returns its content hash
//! - `GET /person/retrieve/{hash_key}` returns the person stored under a hash
//! - `GET /person/retrieve/?hash=...` same lookup, query-string form

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use hoard_core::{ContentHash, Person};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Response body for a successful store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StoreResponse {
    /// Lowercase hex SHA-1 of the person's canonical encoding
    #[schema(value_type = String, example = "11bc71d233c278e5bb81335de664bed2b70f6e4e")]
    pub hash: ContentHash,
}

/// Query parameters for the query-string form of retrieve.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RetrieveQuery {
    /// Content hash returned by populate
    pub hash: String,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// POST /person/populate/ - Store a person
#[utoipa::path(
    post,
    path = "/person/populate/",
    tag = "Person",
    request_body = Person,
    responses(
        (status = 200, description = "Person stored", body = StoreResponse),
        (status = 400, description = "Invalid person", body = ApiError),
        (status = 503, description = "Cache backend unavailable", body = ApiError),
        (status = 504, description = "Cache backend timed out", body = ApiError),
    ),
)]
pub async fn store_person(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Person>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(person) = payload?;
    let hash = state.service.store(&person).await?;
    tracing::debug!(%hash, "Stored person");
    Ok(Json(StoreResponse { hash }))
}

/// GET /person/retrieve/{hash_key} - Retrieve a person by hash
#[utoipa::path(
    get,
    path = "/person/retrieve/{hash_key}",
    tag = "Person",
    params(
        ("hash_key" = String, Path, description = "Content hash returned by populate")
    ),
    responses(
        (status = 200, description = "Person found", body = Person),
        (status = 400, description = "Malformed hash", body = ApiError),
        (status = 404, description = "Person not found", body = ApiError),
        (status = 500, description = "Stored entry is corrupt", body = ApiError),
        (status = 503, description = "Cache backend unavailable", body = ApiError),
        (status = 504, description = "Cache backend timed out", body = ApiError),
    ),
)]
pub async fn retrieve_person(
    State(state): State<Arc<AppState>>,
    Path(hash_key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    retrieve(&state, &hash_key).await
}

/// GET /person/retrieve/?hash=... - Retrieve a person by hash (query form)
#[utoipa::path(
    get,
    path = "/person/retrieve/",
    tag = "Person",
    params(RetrieveQuery),
    responses(
        (status = 200, description = "Person found", body = Person),
        (status = 400, description = "Missing or malformed hash", body = ApiError),
        (status = 404, description = "Person not found", body = ApiError),
        (status = 500, description = "Stored entry is corrupt", body = ApiError),
        (status = 503, description = "Cache backend unavailable", body = ApiError),
        (status = 504, description = "Cache backend timed out", body = ApiError),
    ),
)]
pub async fn retrieve_person_by_query(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RetrieveQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    retrieve(&state, &query.hash).await
}

async fn retrieve(state: &AppState, raw_hash: &str) -> ApiResult<Json<Person>> {
    let hash = ContentHash::parse(raw_hash).map_err(ApiError::from)?;
    let person: Person = state.service.retrieve(&hash).await?;
    Ok(Json(person))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the person router, mounted under `/person`.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/populate/", post(store_person))
        .route("/populate", post(store_person))
        .route("/retrieve/", get(retrieve_person_by_query))
        .route("/retrieve", get(retrieve_person_by_query))
        .route("/retrieve/:hash_key", get(retrieve_person))
}
