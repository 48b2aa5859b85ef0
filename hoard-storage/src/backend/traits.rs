//! Backend capability trait.
//!
//! This module defines the contract every key-value store must satisfy to
//! sit underneath the cache service.

use async_trait::async_trait;
use hoard_core::BackendError;

/// Key-value storage capability consumed by the cache service.
///
/// The trait is object safe so a backend chosen at runtime can be handed
/// around as `Arc<dyn Backend>`.
///
/// # Contract
///
/// - `set` is an upsert: overwriting an existing key, with the same or a
///   different value, succeeds
/// - `get` returns `Ok(None)` for an absent key; absence is never an error and
///   is never confused with a stored empty value
/// - `close` releases held resources; it is safe before any use and safe to
///   call repeatedly. Calls made after `close` fail with `BackendError::Closed`
/// - Failures to reach the store (connection loss, I/O errors) surface as
///   `BackendError::Unavailable`; backends do not retry
///
/// Entries may disappear between calls through mechanisms outside the cache's
/// control (external expiry, manual deletion); callers must tolerate that.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError>;

    /// Fetch the value stored under `key`, or `None` if there is none.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Release the backend's resources. Idempotent.
    async fn close(&self);
}
