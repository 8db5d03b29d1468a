// crates/intersite-core/src/core/hashing.rs
// ============================================================================
// Module: Definitions Digests
// Description: Canonical JSON encoding and SHA-256 digests of site bundles.
// Purpose: Let callers detect changed bundles without diffing them.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! A site bundle is encoded as RFC 8785 (JCS) canonical JSON and digested with
//! SHA-256. Two compilations of the same topology therefore yield the same
//! [`DefinitionsDigest`] for every site, whatever the declaration order.
//! Digests render as `sha256:<lowercase hex>`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::definitions::Definitions;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Label prefixed to every digest.
pub const DIGEST_ALGORITHM: &str = "sha256";

/// Lowercase hex alphabet.
const HEX: &[u8; 16] = b"0123456789abcdef";

// ============================================================================
// SECTION: Digest
// ============================================================================

/// Content digest of one canonical definitions document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionsDigest(String);

impl DefinitionsDigest {
    /// Digests bytes that are already canonical JSON.
    #[must_use]
    pub fn of_canonical_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut value = String::with_capacity(DIGEST_ALGORITHM.len() + 1 + digest.len() * 2);
        value.push_str(DIGEST_ALGORITHM);
        value.push(':');
        for byte in digest.iter().copied() {
            value.push(char::from(HEX[usize::from(byte >> 4)]));
            value.push(char::from(HEX[usize::from(byte & 0x0f)]));
        }
        Self(value)
    }

    /// Returns the `sha256:<hex>` form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the hex part without the algorithm label.
    #[must_use]
    pub fn hex(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, hex)| hex)
    }
}

impl fmt::Display for DefinitionsDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when encoding canonical JSON.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Returns RFC 8785 canonical JSON bytes for `value`.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Digests the canonical JSON of one site bundle.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when the bundle cannot be encoded.
pub fn definitions_digest(definitions: &Definitions) -> Result<DefinitionsDigest, HashError> {
    canonical_json_bytes(definitions).map(|bytes| DefinitionsDigest::of_canonical_bytes(&bytes))
}
