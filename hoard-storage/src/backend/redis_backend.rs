//! Redis-backed backend.
//!
//! Holds a tokio [`ConnectionManager`], which multiplexes commands over one
//! connection and reconnects lazily after the server drops it. Commands that
//! fail while the server is unreachable are reported as unavailable; nothing
//! is retried here.

use async_trait::async_trait;
use hoard_core::BackendError;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use super::traits::Backend;

const BACKEND_NAME: &str = "redis";

fn unavailable(err: redis::RedisError) -> BackendError {
    BackendError::unavailable(BACKEND_NAME, err)
}

/// Backend over a Redis server.
pub struct RedisBackend {
    connection: RwLock<Option<ConnectionManager>>,
}

impl RedisBackend {
    /// Connect to the server at `url` (e.g. `redis://redis:6379`).
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unavailable` if the URL is invalid or the
    /// initial connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let manager = ConnectionManager::new(client).await.map_err(unavailable)?;
        tracing::debug!(url, "Redis backend connected");
        Ok(Self {
            connection: RwLock::new(Some(manager)),
        })
    }

    /// Clone the shared connection handle, failing if the backend was closed.
    async fn connection(&self) -> Result<ConnectionManager, BackendError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(BackendError::Closed)
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await.map_err(unavailable)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(unavailable)
    }

    async fn close(&self) {
        if self.connection.write().await.take().is_some() {
            tracing::debug!("Redis backend closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = RedisBackend::connect("not a redis url").await;
        assert!(matches!(
            result,
            Err(BackendError::Unavailable { backend: "redis", .. })
        ));
    }
}
