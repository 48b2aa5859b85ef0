//! Canonical codec and content hashing.
//!
//! # Canonical form
//!
//! Records are encoded as compact JSON: no insignificant whitespace, fields in
//! struct declaration order, UTF-8 with serde_json's string escaping. Encoding
//! the same logical record twice always yields the same bytes, which is what
//! makes the digest of those bytes usable as a deduplication key.
//!
//! Only that determinism is part of the contract. The exact byte layout is not,
//! and stored entries written under a different layout decode as corrupt
//! rather than being silently reinterpreted.

use sha1::{Digest, Sha1};

use crate::{CodecError, ContentHash, Record};

/// Encode a record into its canonical bytes.
pub fn encode<R: Record>(record: &R) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(record).map_err(|e| CodecError::Encode {
        reason: e.to_string(),
    })
}

/// Decode canonical bytes back into a record.
///
/// Fails on malformed JSON, missing or unexpected fields, wrong field types and
/// values that violate the record's constraints.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R, CodecError> {
    let record: R = serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
        reason: e.to_string(),
    })?;
    record.validate().map_err(|e| CodecError::Decode {
        reason: e.to_string(),
    })?;
    Ok(record)
}

/// SHA-1 digest of `bytes` as lowercase hex.
pub fn content_hash(bytes: &[u8]) -> ContentHash {
    let digest = Sha1::digest(bytes);
    ContentHash::from_digest(digest.as_slice())
}
