//! HOARD Core - Records, Content Hashing and Codec
//!
//! Pure data structures and pure functions. Every other crate depends on this.
//! Nothing in here performs I/O: the storage backends and the cache service
//! live in `hoard-storage`.

pub mod codec;
pub mod error;
pub mod hash;
pub mod record;

pub use codec::{content_hash, decode, encode};
pub use error::{BackendError, CacheError, CacheResult, CodecError, ValidationError};
pub use hash::ContentHash;
pub use record::{Person, Record};
