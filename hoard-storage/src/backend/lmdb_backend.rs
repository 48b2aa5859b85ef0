//! LMDB-backed backend.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a durable,
//! memory-mapped key-value store on local disk.
//!
//! # Layout
//!
//! A single unnamed database maps the UTF-8 bytes of the key to the value
//! bytes exactly as given to `set`. There is no envelope around the value.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The backend uses:
//! - Read transactions for `get`
//! - Write transactions for `set`
//! - Statistics are tracked with atomic counters

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use hoard_core::BackendError;

use super::traits::Backend;

const BACKEND_NAME: &str = "lmdb";

/// Error type for LMDB backend setup and operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert LmdbError to BackendError.
impl From<LmdbError> for BackendError {
    fn from(e: LmdbError) -> Self {
        BackendError::unavailable(BACKEND_NAME, e)
    }
}

/// Read/write counters for an [`LmdbBackend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LmdbStats {
    /// Number of `get` calls that found a value.
    pub hits: u64,
    /// Number of `get` calls that found nothing.
    pub misses: u64,
    /// Number of committed `set` calls.
    pub writes: u64,
}

impl LmdbStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LMDB-backed key-value backend.
///
/// # Example
///
/// ```ignore
/// use hoard_storage::{Backend, LmdbBackend};
///
/// let backend = LmdbBackend::open("/var/lib/hoard", 256)?;
/// backend.set("key", b"value").await?;
/// let value = backend.get("key").await?;
/// backend.close().await;
/// ```
pub struct LmdbBackend {
    /// The LMDB environment; `None` once closed.
    env: RwLock<Option<Env>>,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl LmdbBackend {
    /// Open (or create) an LMDB backend.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - `max_size_mb` does not fit in the address space
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbError> {
        let map_size = max_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                LmdbError::EnvOpen(format!("map size of {} MiB overflows", max_size_mb))
            })?;

        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per directory by this process;
        // callers must not open the same path twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbError::Transaction(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), max_size_mb, "LMDB backend opened");

        Ok(Self {
            env: RwLock::new(Some(env)),
            db,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        })
    }

    /// Snapshot of the read/write counters.
    pub fn stats(&self) -> LmdbStats {
        LmdbStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }

    /// Clone the environment handle, failing if the backend was closed.
    fn env(&self) -> Result<Env, BackendError> {
        let guard = self
            .env
            .read()
            .map_err(|_| BackendError::unavailable(BACKEND_NAME, "environment lock poisoned"))?;
        guard.clone().ok_or(BackendError::Closed)
    }
}

#[async_trait]
impl Backend for LmdbBackend {
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        let env = self.env()?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(|e| LmdbError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbError::Transaction(e.to_string()))?;

        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let env = self.env()?;

        let rtxn = env
            .read_txn()
            .map_err(|e| LmdbError::Transaction(e.to_string()))?;

        let value = self
            .db
            .get(&rtxn, key.as_bytes())
            .map_err(|e| LmdbError::Transaction(e.to_string()))?
            .map(|bytes| bytes.to_vec());

        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };

        Ok(value)
    }

    async fn close(&self) {
        let taken = match self.env.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if taken.is_some() {
            let stats = self.stats();
            tracing::debug!(
                hits = stats.hits,
                misses = stats.misses,
                writes = stats.writes,
                hit_rate = stats.hit_rate(),
                "LMDB backend closed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_backend() -> (LmdbBackend, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let backend =
            LmdbBackend::open(temp_dir.path(), 10).expect("backend creation should succeed");
        (backend, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (backend, _temp_dir) = create_test_backend();

        backend
            .set("abc", b"{\"k\":1}")
            .await
            .expect("set should succeed");

        let value = backend.get("abc").await.expect("get should succeed");
        assert_eq!(value.as_deref(), Some(&b"{\"k\":1}"[..]));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let (backend, _temp_dir) = create_test_backend();

        let value = backend.get("missing").await.expect("get should succeed");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_empty_value_is_distinct_from_absent() {
        let (backend, _temp_dir) = create_test_backend();

        backend.set("empty", b"").await.expect("set should succeed");
        let value = backend.get("empty").await.expect("get should succeed");
        assert_eq!(value, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_overwrite() {
        let (backend, _temp_dir) = create_test_backend();

        backend.set("k", b"first").await.expect("set should succeed");
        backend.set("k", b"second").await.expect("overwrite should succeed");

        let value = backend.get("k").await.expect("get should succeed");
        assert_eq!(value.as_deref(), Some(&b"second"[..]));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        {
            let backend =
                LmdbBackend::open(temp_dir.path(), 10).expect("backend creation should succeed");
            backend.set("durable", b"yes").await.expect("set should succeed");
            backend.close().await;
        }

        let reopened =
            LmdbBackend::open(temp_dir.path(), 10).expect("reopen should succeed");
        let value = reopened.get("durable").await.expect("get should succeed");
        assert_eq!(value.as_deref(), Some(&b"yes"[..]));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (backend, _temp_dir) = create_test_backend();

        backend.close().await;
        backend.close().await;

        assert_eq!(backend.get("k").await, Err(BackendError::Closed));
        assert_eq!(backend.set("k", b"v").await, Err(BackendError::Closed));
    }

    #[tokio::test]
    async fn test_stats() {
        let (backend, _temp_dir) = create_test_backend();

        // Miss
        let _ = backend.get("k").await;

        backend.set("k", b"v").await.expect("set should succeed");

        // Hits
        let _ = backend.get("k").await;
        let _ = backend.get("k").await;

        let stats = backend.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.writes, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 0.001);

        // Counters survive close so the final snapshot can be reported.
        backend.close().await;
        assert_eq!(backend.stats(), stats);
    }

    #[test]
    fn test_open_rejects_oversized_map() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let result = LmdbBackend::open(temp_dir.path(), usize::MAX);
        assert!(matches!(result, Err(LmdbError::EnvOpen(_))));
    }

    #[test]
    fn test_lmdb_error_converts_to_unavailable() {
        let err: BackendError = LmdbError::Transaction("MDB_MAP_FULL".to_string()).into();
        assert!(matches!(err, BackendError::Unavailable { backend: "lmdb", .. }));
    }
}
