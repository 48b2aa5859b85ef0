//! HOARD API - HTTP adapter for the content-addressed cache
//!
//! Exposes the cache service over axum routes, maps cache errors onto HTTP
//! status codes, and ships a typed `reqwest` client for the same routes.

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use hoard_storage::{Backend, CacheService, InMemoryBackend, LmdbBackend};
use tower_http::trace::TraceLayer;

pub mod client;
pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use client::{ApiClient, ApiClientError};
pub use config::{ApiConfig, BackendConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Build the full application router.
///
/// Routes:
/// - `/person/*` - store and retrieve
/// - `/health/*` - liveness probes
/// - `/openapi.json` - API document
pub fn create_api_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .nest("/person", routes::person::create_router())
        .nest("/health", routes::health::create_router())
        .route("/openapi.json", get(openapi::openapi_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Open the configured backend.
///
/// The caller owns the returned handle and must `close` it on shutdown.
pub async fn connect_backend(config: &BackendConfig) -> ApiResult<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match config {
        BackendConfig::Memory => Arc::new(InMemoryBackend::new()),
        BackendConfig::Lmdb { path, max_size_mb } => {
            let backend = LmdbBackend::open(path, *max_size_mb).map_err(|e| {
                ApiError::service_unavailable(format!("Failed to open LMDB backend: {}", e))
            })?;
            Arc::new(backend)
        }
        #[cfg(feature = "redis")]
        BackendConfig::Redis { url } => {
            let backend = hoard_storage::RedisBackend::connect(url)
                .await
                .map_err(|e| {
                    ApiError::service_unavailable(format!("Failed to connect to Redis: {}", e))
                })?;
            Arc::new(backend)
        }
        #[cfg(not(feature = "redis"))]
        BackendConfig::Redis { .. } => {
            return Err(ApiError::invalid_input(
                "Redis backend requested but hoard-api was built without the `redis` feature",
            ))
        }
    };

    tracing::info!(backend = config.kind(), "Cache backend opened");
    Ok(backend)
}

/// Serve the API over an already opened backend until a shutdown signal.
///
/// The backend is closed before returning, whether the server stopped
/// cleanly or failed (including failing to bind).
pub async fn run(config: &ApiConfig, backend: Arc<dyn Backend>) -> ApiResult<()> {
    run_until(config, backend, shutdown_signal()).await
}

/// Like [`run`], but stops when `shutdown` completes.
pub async fn run_until<F>(
    config: &ApiConfig,
    backend: Arc<dyn Backend>,
    shutdown: F,
) -> ApiResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let result = serve(config, Arc::clone(&backend), shutdown).await;

    backend.close().await;
    tracing::info!("Cache backend closed");

    if let Err(e) = &result {
        tracing::error!(error = %e, "Server exited with error");
    }
    result
}

async fn serve<F>(config: &ApiConfig, backend: Arc<dyn Backend>, shutdown: F) -> ApiResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_addr()?;
    let service = CacheService::with_config(backend, config.service_config());
    let app = create_api_router(AppState::new(service));

    tracing::info!(%addr, backend = config.backend.kind(), "Starting HOARD API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
