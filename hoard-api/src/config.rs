//! API Configuration Module
//!
//! Configuration for the server binary: where to listen, which backend to
//! open, and how the cache service treats it. Loaded from environment
//! variables with defaults suited to the docker-compose deployment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use hoard_storage::ServiceConfig;

use crate::error::{ApiError, ApiResult};

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REDIS_URL: &str = "redis://redis:6379";
const DEFAULT_LMDB_PATH: &str = "./data/hoard";
const DEFAULT_LMDB_MAX_SIZE_MB: usize = 256;

// ============================================================================
// BACKEND CONFIGURATION
// ============================================================================

/// Which key-value store backs the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Process-local map. Contents are lost on restart.
    Memory,
    /// LMDB environment in a local directory.
    Lmdb { path: PathBuf, max_size_mb: usize },
    /// Redis server.
    Redis { url: String },
}

impl BackendConfig {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Memory => "memory",
            BackendConfig::Lmdb { .. } => "lmdb",
            BackendConfig::Redis { .. } => "redis",
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Redis {
            url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host or IP to bind.
    pub bind_host: String,

    /// TCP port to bind.
    pub port: u16,

    /// Backend opened at start-up.
    pub backend: BackendConfig,

    /// Upper bound on each backend call.
    pub backend_timeout: Option<Duration>,

    /// Re-hash fetched entries before decoding them.
    pub verify_integrity: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            backend: BackendConfig::default(),
            backend_timeout: None,
            verify_integrity: false,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `HOARD_API_BIND`: Host to bind (default: 0.0.0.0)
    /// - `PORT` or `HOARD_API_PORT`: Port to bind (default: 8000)
    /// - `HOARD_BACKEND`: "memory", "lmdb" or "redis" (default: redis)
    /// - `HOARD_REDIS_URL`: Redis URL (default: redis://redis:6379)
    /// - `HOARD_LMDB_PATH`: LMDB directory (default: ./data/hoard)
    /// - `HOARD_LMDB_MAX_SIZE_MB`: LMDB map size (default: 256)
    /// - `HOARD_BACKEND_TIMEOUT_MS`: Per-call backend timeout (default: none)
    /// - `HOARD_VERIFY_INTEGRITY`: "true" or "false" (default: false)
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// An invalid port or an unknown backend kind is an error. Other numeric
    /// values that fail to parse fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_host = lookup("HOARD_API_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = match lookup("PORT").or_else(|| lookup("HOARD_API_PORT")) {
            Some(value) => value.parse::<u16>().map_err(|_| {
                ApiError::invalid_input(format!("Invalid port value: {}", value))
            })?,
            None => DEFAULT_PORT,
        };

        let backend = match lookup("HOARD_BACKEND")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("redis") => BackendConfig::Redis {
                url: lookup("HOARD_REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            },
            Some("lmdb") => BackendConfig::Lmdb {
                path: lookup("HOARD_LMDB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LMDB_PATH)),
                max_size_mb: lookup("HOARD_LMDB_MAX_SIZE_MB")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_LMDB_MAX_SIZE_MB),
            },
            Some("memory") => BackendConfig::Memory,
            Some(other) => {
                return Err(ApiError::invalid_input(format!(
                    "Unknown backend '{}', expected memory, lmdb or redis",
                    other
                )))
            }
        };

        let backend_timeout = lookup("HOARD_BACKEND_TIMEOUT_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let verify_integrity = lookup("HOARD_VERIFY_INTEGRITY")
            .map(|s| s == "true" || s == "1")
            .unwrap_or(false);

        Ok(Self {
            bind_host,
            port,
            backend,
            backend_timeout,
            verify_integrity,
        })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }

    /// Cache service settings derived from this configuration.
    pub fn service_config(&self) -> ServiceConfig {
        let config = ServiceConfig::new().with_integrity_check(self.verify_integrity);
        match self.backend_timeout {
            Some(timeout) => config.with_backend_timeout(timeout),
            None => config,
        }
    }
}
