//! Shared application state for Axum handlers.

use std::sync::Arc;
use std::time::Instant;

use hoard_storage::{Backend, CacheService};

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub service: CacheService<dyn Backend>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: CacheService<dyn Backend>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }

    /// Build state over a backend with default service settings.
    pub fn from_backend(backend: Arc<dyn Backend>) -> Self {
        Self::new(CacheService::new(backend))
    }
}
