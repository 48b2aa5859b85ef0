//! HOARD Test Utilities
//!
//! Centralized test infrastructure for the HOARD workspace:
//! - Proptest generators for records
//! - Fixtures for the canonical John Doe scenario
//! - Fault-injecting and counting backends

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use proptest::prelude::*;

// Re-export core types for convenience
pub use hoard_core::{
    content_hash, decode, encode, BackendError, CacheError, CacheResult, CodecError, ContentHash,
    Person, Record, ValidationError,
};
pub use hoard_storage::{Backend, CacheService, InMemoryBackend, ServiceConfig};

// ============================================================================
// FIXTURES
// ============================================================================

/// Canonical encoding of [`john_doe`].
pub const JOHN_DOE_JSON: &str =
    r#"{"first_name":"John","last_name":"Doe","email":"john.doe@example.com","age":30}"#;

/// Content hash of [`JOHN_DOE_JSON`].
pub const JOHN_DOE_HASH: &str = "11bc71d233c278e5bb81335de664bed2b70f6e4e";

/// A well-formed hash that nothing is ever stored under.
pub const UNUSED_HASH: &str = "0000000000000000000000000000000000000000";

pub fn john_doe() -> Person {
    Person::new("John", "Doe", "john.doe@example.com", 30).expect("John Doe fixture is valid")
}

pub fn unused_hash() -> ContentHash {
    ContentHash::parse(UNUSED_HASH).expect("unused hash fixture is well formed")
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Generate a non-blank name, including multi-byte characters.
pub fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][A-Za-z '\\-]{0,20}",
        "[\\p{L}][\\p{L} ]{0,12}",
    ]
}

/// Generate an email-looking string. The core never checks email syntax.
pub fn arb_email() -> impl Strategy<Value = String> {
    "[a-z0-9._%+]{1,12}@[a-z0-9]{1,10}\\.[a-z]{2,4}"
}

/// Generate a valid person.
pub fn arb_person() -> impl Strategy<Value = Person> {
    (arb_name(), arb_name(), arb_email(), 0i64..=150).prop_map(|(first, last, email, age)| {
        Person::new(first, last, email, age).expect("generated person is valid")
    })
}

/// Generate two people that differ in at least one field.
pub fn arb_distinct_people() -> impl Strategy<Value = (Person, Person)> {
    (arb_person(), arb_person()).prop_filter("people must differ", |(a, b)| a != b)
}

// ============================================================================
// FAULTY BACKENDS
// ============================================================================

/// How a [`FaultyBackend`] misbehaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultMode {
    /// Every call fails as if the server were unreachable.
    Unavailable,
    /// Writes succeed and are discarded; every read returns these bytes.
    Garbage(Vec<u8>),
    /// Every call hangs forever.
    Stall,
}

/// Backend that fails in a chosen way, for exercising error paths.
#[derive(Debug, Clone)]
pub struct FaultyBackend {
    mode: FaultMode,
}

impl FaultyBackend {
    pub fn new(mode: FaultMode) -> Self {
        Self { mode }
    }

    pub fn unavailable() -> Self {
        Self::new(FaultMode::Unavailable)
    }

    pub fn garbage(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(FaultMode::Garbage(bytes.into()))
    }

    pub fn stall() -> Self {
        Self::new(FaultMode::Stall)
    }

    fn refused() -> BackendError {
        BackendError::unavailable("faulty", "connection refused")
    }
}

#[async_trait]
impl Backend for FaultyBackend {
    async fn set(&self, _key: &str, _value: &[u8]) -> Result<(), BackendError> {
        match &self.mode {
            FaultMode::Unavailable => Err(Self::refused()),
            FaultMode::Garbage(_) => Ok(()),
            FaultMode::Stall => std::future::pending().await,
        }
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        match &self.mode {
            FaultMode::Unavailable => Err(Self::refused()),
            FaultMode::Garbage(bytes) => Ok(Some(bytes.clone())),
            FaultMode::Stall => std::future::pending().await,
        }
    }

    async fn close(&self) {}
}

/// Wraps a backend and counts calls to it.
#[derive(Debug, Default)]
pub struct CountingBackend<B = InMemoryBackend> {
    inner: B,
    sets: AtomicUsize,
    gets: AtomicUsize,
    closes: AtomicUsize,
}

impl<B: Backend> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            sets: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<B: Backend> Backend for CountingBackend<B> {
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await;
    }
}
