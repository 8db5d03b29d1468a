// crates/intersite-core/src/core/options.rs
// ============================================================================
// Module: Intersite Compile Options
// Description: Naming and queue policy shared by every emitted object.
// Purpose: Keep broker object names stable and overridable in one place.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`CompileOptions`] is immutable input to the compiler alongside the
//! connection list. Defaults reproduce the established broker layout
//! (`cmk.intersite` exchange and queue namespace, `cmk.shovel` relays).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::SiteId;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default shared topic exchange name.
pub const DEFAULT_EXCHANGE: &str = "cmk.intersite";
/// Default intersite queue namespace.
pub const DEFAULT_QUEUE_PREFIX: &str = "cmk.intersite";
/// Default relay (shovel) name prefix.
pub const DEFAULT_SHOVEL_PREFIX: &str = "cmk.shovel";
/// Default per-message TTL for intersite queues (one minute).
pub const DEFAULT_MESSAGE_TTL_MS: u64 = 60_000;
/// Default byte cap for intersite queues (512 MiB).
pub const DEFAULT_MAX_LENGTH_BYTES: u64 = 512 * 1024 * 1024;

// ============================================================================
// SECTION: Queue Arguments
// ============================================================================

/// Broker arguments attached to every intersite queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueueArguments {
    /// Per-message time-to-live in milliseconds.
    #[serde(rename = "x-message-ttl")]
    pub message_ttl_ms: u64,
    /// Maximum total queue size in bytes.
    #[serde(rename = "x-max-length-bytes")]
    pub max_length_bytes: u64,
}

impl Default for QueueArguments {
    fn default() -> Self {
        Self {
            message_ttl_ms: DEFAULT_MESSAGE_TTL_MS,
            max_length_bytes: DEFAULT_MAX_LENGTH_BYTES,
        }
    }
}

// ============================================================================
// SECTION: TLS References
// ============================================================================

/// Certificate file references appended to outbound relay URIs.
///
/// # Invariants
/// - Only file paths are carried; key material never enters the definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsReferences {
    /// CA bundle used to verify the remote broker.
    pub cacertfile: Option<String>,
    /// Client certificate presented to the remote broker.
    pub certfile: Option<String>,
    /// Client private key file.
    pub keyfile: Option<String>,
}

impl TlsReferences {
    /// Returns the configured references as URI query pairs in stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(path) = &self.cacertfile {
            pairs.push(("cacertfile", path.as_str()));
        }
        if let Some(path) = &self.certfile {
            pairs.push(("certfile", path.as_str()));
        }
        if let Some(path) = &self.keyfile {
            pairs.push(("keyfile", path.as_str()));
        }
        pairs
    }
}

// ============================================================================
// SECTION: Compile Options
// ============================================================================

/// Naming and queue policy for a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Shared topic exchange name (also the write permission pattern).
    pub exchange: String,
    /// Intersite queue namespace.
    pub queue_prefix: String,
    /// Relay name prefix.
    pub shovel_prefix: String,
    /// Arguments attached to every intersite queue.
    pub queue_arguments: QueueArguments,
    /// Certificate references for outbound relays.
    pub tls: TlsReferences,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            exchange: DEFAULT_EXCHANGE.to_string(),
            queue_prefix: DEFAULT_QUEUE_PREFIX.to_string(),
            shovel_prefix: DEFAULT_SHOVEL_PREFIX.to_string(),
            queue_arguments: QueueArguments::default(),
            tls: TlsReferences::default(),
        }
    }
}

impl CompileOptions {
    /// Returns the queue name that forwards toward `peer`.
    #[must_use]
    pub fn queue_name(&self, peer: &SiteId) -> String {
        format!("{}.{}", self.queue_prefix, peer)
    }

    /// Returns the read permission pattern covering every intersite queue.
    #[must_use]
    pub fn read_pattern(&self) -> String {
        format!("{}..*", self.queue_prefix)
    }

    /// Returns the relay name moving messages from `from` to `to`.
    #[must_use]
    pub fn shovel_name(&self, from: &SiteId, to: &SiteId) -> String {
        format!("{}.{}->{}", self.shovel_prefix, from, to)
    }
}
