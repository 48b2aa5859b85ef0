//! Content-addressed cache service.
//!
//! Orchestrates the codec and a [`Backend`]:
//!
//! - `store`: validate, encode, hash, write once under the hash, return the hash
//! - `retrieve`: read by hash, decode, or report why not
//!
//! The service is stateless between calls and never opens or closes the
//! backend it is given. It does no retries and emits no log events; every
//! failure comes back to the caller as a [`CacheError`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hoard_core::{
    codec, BackendError, CacheError, CacheResult, ContentHash, Record, ValidationError,
};
use tracing::Instrument;

use crate::backend::Backend;

/// Configuration for the cache service.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Upper bound on a single backend call. `None` waits as long as the
    /// backend does.
    pub backend_timeout: Option<Duration>,
    /// Re-hash fetched bytes on `retrieve` and treat a mismatch as corruption.
    pub verify_integrity: bool,
}

impl ServiceConfig {
    /// Create a new service config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every backend call by `timeout`.
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = Some(timeout);
        self
    }

    /// Enable or disable integrity verification on retrieve.
    pub fn with_integrity_check(mut self, enabled: bool) -> Self {
        self.verify_integrity = enabled;
        self
    }
}

/// Stores and retrieves records keyed by the hash of their canonical encoding.
///
/// # Example
///
/// ```ignore
/// let backend: Arc<dyn Backend> = Arc::new(InMemoryBackend::new());
/// let service = CacheService::new(backend.clone());
///
/// let hash = service.store(&person).await?;
/// let again: Person = service.retrieve(&hash).await?;
///
/// // The service borrows the backend; its owner closes it.
/// backend.close().await;
/// ```
pub struct CacheService<B: Backend + ?Sized> {
    backend: Arc<B>,
    config: ServiceConfig,
}

impl<B: Backend + ?Sized> Clone for CacheService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
        }
    }
}

impl<B: Backend + ?Sized> CacheService<B> {
    /// Create a service over an already open backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_config(backend, ServiceConfig::default())
    }

    /// Create a service with explicit configuration.
    pub fn with_config(backend: Arc<B>, config: ServiceConfig) -> Self {
        Self { backend, config }
    }

    /// Get the service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Get a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store a record and return its content hash.
    ///
    /// Always performs exactly one backend write, even if an entry already
    /// exists under the hash.
    ///
    /// # Errors
    ///
    /// - `Validation` if the record fails its constraints; the backend is not touched
    /// - `BackendUnavailable` if the write fails or times out
    pub async fn store<R: Record>(&self, record: &R) -> CacheResult<ContentHash> {
        record.validate()?;
        let bytes = codec::encode(record).map_err(|e| ValidationError::Unencodable {
            reason: e.to_string(),
        })?;
        let hash = codec::content_hash(&bytes);

        let span = tracing::debug_span!("cache.store", kind = R::KIND, hash = %hash);
        self.bounded("set", self.backend.set(hash.as_str(), &bytes))
            .instrument(span)
            .await?;

        Ok(hash)
    }

    /// Retrieve the record stored under `hash`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing is stored under the hash
    /// - `CorruptEntry` if the stored bytes do not decode into an `R`, or do not
    ///   match the hash when integrity checking is on
    /// - `BackendUnavailable` if the read fails or times out
    pub async fn retrieve<R: Record>(&self, hash: &ContentHash) -> CacheResult<R> {
        let span = tracing::debug_span!("cache.retrieve", kind = R::KIND, hash = %hash);
        let bytes = self
            .bounded("get", self.backend.get(hash.as_str()))
            .instrument(span)
            .await?
            .ok_or_else(|| CacheError::NotFound { hash: hash.clone() })?;

        if self.config.verify_integrity {
            let actual = codec::content_hash(&bytes);
            if &actual != hash {
                return Err(CacheError::CorruptEntry {
                    hash: hash.clone(),
                    reason: format!("content hashes to {}", actual),
                });
            }
        }

        codec::decode(&bytes).map_err(|e| CacheError::CorruptEntry {
            hash: hash.clone(),
            reason: e.to_string(),
        })
    }

    /// Apply the configured timeout to a backend call.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        match self.config.backend_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| BackendError::Timeout { operation, timeout })?,
            None => call.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use async_trait::async_trait;
    use hoard_core::Person;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn john_doe() -> Person {
        Person::new("John", "Doe", "john.doe@example.com", 30).expect("fixture is valid")
    }

    fn in_memory_service() -> (CacheService<InMemoryBackend>, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::new());
        (CacheService::new(Arc::clone(&backend)), backend)
    }

    fn zero_hash() -> ContentHash {
        ContentHash::parse("0000000000000000000000000000000000000000")
            .expect("all-zero hash is well formed")
    }

    /// Backend whose every call fails as if the server were down.
    struct DownBackend;

    #[async_trait]
    impl Backend for DownBackend {
        async fn set(&self, _key: &str, _value: &[u8]) -> Result<(), BackendError> {
            Err(BackendError::unavailable("down", "connection refused"))
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BackendError> {
            Err(BackendError::unavailable("down", "connection refused"))
        }

        async fn close(&self) {}
    }

    /// Backend that never answers.
    struct HangingBackend;

    #[async_trait]
    impl Backend for HangingBackend {
        async fn set(&self, _key: &str, _value: &[u8]) -> Result<(), BackendError> {
            std::future::pending().await
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BackendError> {
            std::future::pending().await
        }

        async fn close(&self) {}
    }

    /// Counts writes before delegating to an in-memory map.
    #[derive(Default)]
    struct CountingBackend {
        inner: InMemoryBackend,
        sets: AtomicUsize,
    }

    #[async_trait]
    impl Backend for CountingBackend {
        async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
            self.inner.get(key).await
        }

        async fn close(&self) {
            self.inner.close().await;
        }
    }

    #[tokio::test]
    async fn test_store_then_retrieve_john_doe() {
        let (service, _backend) = in_memory_service();

        let hash = service.store(&john_doe()).await.expect("store should succeed");
        assert_eq!(hash.as_str().len(), ContentHash::HEX_LEN);
        assert_eq!(hash.as_str(), "11bc71d233c278e5bb81335de664bed2b70f6e4e");

        let person: Person = service.retrieve(&hash).await.expect("retrieve should succeed");
        assert_eq!(person, john_doe());
    }

    #[tokio::test]
    async fn test_retrieve_unknown_hash_is_not_found() {
        let (service, _backend) = in_memory_service();

        let err = service
            .retrieve::<Person>(&zero_hash())
            .await
            .expect_err("unknown hash must fail");
        assert_eq!(err, CacheError::NotFound { hash: zero_hash() });
    }

    #[tokio::test]
    async fn test_store_is_idempotent_and_always_writes() {
        let backend = Arc::new(CountingBackend::default());
        let service = CacheService::new(Arc::clone(&backend));

        let first = service.store(&john_doe()).await.expect("store should succeed");
        let second = service.store(&john_doe()).await.expect("store should succeed");

        assert_eq!(first, second);
        assert_eq!(backend.sets.load(Ordering::SeqCst), 2);
        assert_eq!(backend.inner.len().await, 1);

        let person: Person = service.retrieve(&first).await.expect("retrieve should succeed");
        assert_eq!(person, john_doe());
    }

    #[tokio::test]
    async fn test_garbage_entry_is_corrupt() {
        let (service, backend) = in_memory_service();
        backend
            .set(zero_hash().as_str(), br#"{"first_name":"John","last"#)
            .await
            .expect("set should succeed");

        let err = service
            .retrieve::<Person>(&zero_hash())
            .await
            .expect_err("truncated entry must fail");
        assert!(matches!(err, CacheError::CorruptEntry { .. }));
    }

    #[tokio::test]
    async fn test_empty_entry_is_corrupt_not_missing() {
        let (service, backend) = in_memory_service();
        backend
            .set(zero_hash().as_str(), b"")
            .await
            .expect("set should succeed");

        let err = service
            .retrieve::<Person>(&zero_hash())
            .await
            .expect_err("empty entry must fail");
        assert!(matches!(err, CacheError::CorruptEntry { .. }));
    }

    #[tokio::test]
    async fn test_entry_vanishing_between_calls_is_not_found() {
        let (service, backend) = in_memory_service();
        let hash = service.store(&john_doe()).await.expect("store should succeed");

        assert!(backend.remove(hash.as_str()).await);

        let err = service
            .retrieve::<Person>(&hash)
            .await
            .expect_err("expired entry must fail");
        assert!(matches!(err, CacheError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_as_unavailable() {
        let service = CacheService::new(Arc::new(DownBackend));

        let err = service.store(&john_doe()).await.expect_err("store must fail");
        assert!(matches!(err, CacheError::BackendUnavailable(_)));

        let err = service
            .retrieve::<Person>(&zero_hash())
            .await
            .expect_err("retrieve must fail");
        assert!(matches!(err, CacheError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn test_closed_backend_surfaces_as_unavailable() {
        let (service, backend) = in_memory_service();
        backend.close().await;

        let err = service.store(&john_doe()).await.expect_err("store must fail");
        assert_eq!(err, CacheError::BackendUnavailable(BackendError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_as_unavailable() {
        let config = ServiceConfig::new().with_backend_timeout(Duration::from_millis(50));
        let service = CacheService::with_config(Arc::new(HangingBackend), config);

        let err = service.store(&john_doe()).await.expect_err("store must time out");
        assert_eq!(
            err,
            CacheError::BackendUnavailable(BackendError::Timeout {
                operation: "set",
                timeout: Duration::from_millis(50),
            })
        );

        let err = service
            .retrieve::<Person>(&zero_hash())
            .await
            .expect_err("retrieve must time out");
        assert!(matches!(
            err,
            CacheError::BackendUnavailable(BackendError::Timeout { operation: "get", .. })
        ));
    }

    #[tokio::test]
    async fn test_integrity_check_detects_tampering() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = CacheService::with_config(
            Arc::clone(&backend),
            ServiceConfig::new().with_integrity_check(true),
        );

        let hash = service.store(&john_doe()).await.expect("store should succeed");

        // Valid record, but not the one that hashes to `hash`.
        let other = Person::new("Jane", "Doe", "jane.doe@example.com", 31)
            .expect("fixture is valid");
        let other_bytes = codec::encode(&other).expect("encode should succeed");
        backend
            .set(hash.as_str(), &other_bytes)
            .await
            .expect("set should succeed");

        let err = service
            .retrieve::<Person>(&hash)
            .await
            .expect_err("tampered entry must fail");
        assert!(matches!(err, CacheError::CorruptEntry { .. }));
    }

    #[tokio::test]
    async fn test_without_integrity_check_foreign_layout_decodes() {
        let (service, backend) = in_memory_service();
        let spaced = br#"{"first_name": "John", "last_name": "Doe", "email": "john.doe@example.com", "age": 30}"#;
        backend
            .set(zero_hash().as_str(), spaced)
            .await
            .expect("set should succeed");

        let person: Person = service
            .retrieve(&zero_hash())
            .await
            .expect("retrieve should succeed");
        assert_eq!(person, john_doe());
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let backend: Arc<dyn Backend> = Arc::new(InMemoryBackend::new());
        let service = CacheService::new(Arc::clone(&backend));

        let hash = service.store(&john_doe()).await.expect("store should succeed");
        let person: Person = service.retrieve(&hash).await.expect("retrieve should succeed");
        assert_eq!(person, john_doe());

        backend.close().await;
    }

    #[tokio::test]
    async fn test_concurrent_stores_of_same_record_agree() {
        let (service, backend) = in_memory_service();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.store(&john_doe()).await })
            })
            .collect();

        let mut hashes = Vec::new();
        for handle in handles {
            hashes.push(
                handle
                    .await
                    .expect("task should not panic")
                    .expect("store should succeed"),
            );
        }

        assert!(hashes.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(backend.len().await, 1);
    }

    fn arb_person() -> impl Strategy<Value = Person> {
        (
            "[A-Za-z][A-Za-z '\\-]{0,15}",
            "[A-Za-z][A-Za-z '\\-]{0,15}",
            "[a-z0-9._]{1,10}@[a-z]{1,8}\\.[a-z]{2,3}",
            0i64..=130,
        )
            .prop_map(|(first, last, email, age)| {
                Person::new(first, last, email, age).expect("generated person is valid")
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_retrieve_returns_what_was_stored(person in arb_person()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime should build");
            let (service, _backend) = in_memory_service();

            let retrieved: Person = rt.block_on(async {
                let hash = service.store(&person).await.expect("store should succeed");
                service.retrieve(&hash).await.expect("retrieve should succeed")
            });
            prop_assert_eq!(retrieved, person);
        }
    }
}
