//! Optimistic-concurrency version token
//!
//! An opaque 16-byte value regenerated on every committed write of a task
//! row. Clients carry it base64-encoded in the `If-Match` header; a stored
//! row whose token no longer equals the submitted one has been modified
//! concurrently. Deliberately not the store's native rowversion type, so
//! the model stays portable across stores.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Per-row opaque concurrency token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionToken(Uuid);

impl VersionToken {
    /// Generate a fresh token, distinct from all previous ones
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a token from an existing UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse the storage form (hyphenated UUID string)
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Encode the raw 16 bytes as base64 for the wire
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0.as_bytes())
    }

    /// Decode the wire form; exactly 16 decoded bytes are accepted
    pub fn from_base64(encoded: &str) -> Result<Self, DomainError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| DomainError::InvalidVersionToken(e.to_string()))?;
        let raw: [u8; 16] = bytes
            .try_into()
            .map_err(|_| DomainError::InvalidVersionToken("expected 16 bytes".to_string()))?;
        Ok(Self(Uuid::from_bytes(raw)))
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
