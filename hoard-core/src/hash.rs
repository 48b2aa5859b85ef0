//! Content hash type.
//!
//! A [`ContentHash`] is the only lookup key in the cache. It is always the
//! lowercase hex rendering of a 160-bit SHA-1 digest, so it is exactly
//! [`ContentHash::HEX_LEN`] characters long.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ValidationError;

/// Lowercase hex SHA-1 digest of a record's canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Number of hex characters in a hash.
    pub const HEX_LEN: usize = 40;

    /// Build a hash from raw digest bytes.
    pub(crate) fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Parse a hash supplied by a caller.
    ///
    /// Uppercase hex is accepted and normalised; anything that is not exactly
    /// forty hex characters is rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.len() != Self::HEX_LEN {
            return Err(ValidationError::InvalidValue {
                field: "hash".to_string(),
                reason: format!(
                    "expected {} hex characters, got {}",
                    Self::HEX_LEN,
                    input.len()
                ),
            });
        }
        if !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidValue {
                field: "hash".to_string(),
                reason: "contains non-hex characters".to_string(),
            });
        }
        Ok(Self(input.to_ascii_lowercase()))
    }

    /// Borrow the hex string, e.g. to use as a backend key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
