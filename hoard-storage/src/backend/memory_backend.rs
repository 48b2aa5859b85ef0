//! In-memory backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use hoard_core::BackendError;
use tokio::sync::RwLock;

use super::traits::Backend;

/// Process-local backend over a `HashMap`.
///
/// Useful for tests and for running the API without external services.
/// Closing it drops every entry.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    closed: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an entry, as an external expiry would. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.is_closed() {
            return Err(BackendError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        self.ensure_open()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.ensure_open()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.entries.write().await.clear();
            tracing::debug!("In-memory backend closed");
        }
    }
}
