//! HOARD Storage - Backends and Cache Service
//!
//! Defines the key-value [`Backend`] capability the cache depends on, a few
//! implementations of it, and the [`CacheService`] that stores and retrieves
//! records by content hash.

pub mod backend;
pub mod service;

pub use backend::{Backend, InMemoryBackend, LmdbBackend, LmdbError};
#[cfg(feature = "redis")]
pub use backend::RedisBackend;
pub use service::{CacheService, ServiceConfig};
