//! HOARD API Server Entry Point
//!
//! Loads configuration, opens the cache backend once, and serves the axum
//! router until the server fails or a shutdown signal arrives. `run` closes
//! the backend on every exit path after it was opened.

use hoard_api::telemetry::{init_tracing, TelemetryConfig};
use hoard_api::{connect_backend, run, ApiConfig, ApiResult};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    // Fail on a bad bind address before opening the backend.
    api_config.bind_addr()?;

    let backend = connect_backend(&api_config.backend).await?;
    run(&api_config, backend).await
}
