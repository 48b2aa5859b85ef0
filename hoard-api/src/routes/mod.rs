//! REST API Route Handlers

pub mod health;
pub mod person;

pub use health::{HealthResponse, HealthStatus};
pub use person::{RetrieveQuery, StoreResponse};
