//! Key-value backends.
//!
//! The cache service only ever talks to the three-method [`Backend`] trait, so
//! any store that can `set`, `get` and `close` can sit underneath it:
//!
//! - [`InMemoryBackend`] for tests and single-process deployments
//! - [`LmdbBackend`] for a durable local store
//! - `RedisBackend` (feature `redis`) for a shared networked store

pub mod lmdb_backend;
pub mod memory_backend;
#[cfg(feature = "redis")]
pub mod redis_backend;
pub mod traits;

pub use lmdb_backend::{LmdbBackend, LmdbError};
pub use memory_backend::InMemoryBackend;
#[cfg(feature = "redis")]
pub use redis_backend::RedisBackend;
pub use traits::Backend;
