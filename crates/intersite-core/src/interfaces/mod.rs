// crates/intersite-core/src/interfaces/mod.rs
// ============================================================================
// Module: Intersite Interfaces
// Description: Backend-agnostic hooks observed by the topology compiler.
// Purpose: Define the audit surface without binding the core to an output.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The compiler itself never writes logs. It reports what it did through a
//! [`CompileAuditSink`]; hosts decide whether events go to stderr, a file or
//! nowhere at all.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::Customer;

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Structured audit event emitted while compiling a topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CompileAuditEvent {
    /// A connection failed validation and aborted the compilation.
    ConnectionRejected {
        /// Stable error label.
        reason: String,
        /// Human-readable error message.
        message: String,
    },
    /// Shortest paths were computed for one tenant graph.
    TenantSolved {
        /// Effective tenant of the graph.
        tenant: Customer,
        /// Number of sites in the graph.
        sites: usize,
        /// Number of undirected edges in the graph.
        edges: usize,
        /// Number of reachable ordered pairs.
        paths: usize,
    },
    /// Multi-hop bindings were materialized for one tenant graph.
    BindingsMaterialized {
        /// Effective tenant of the graph.
        tenant: Customer,
        /// Number of newly emitted bindings.
        bindings: usize,
        /// Number of relay hops already emitted by an earlier path.
        skipped_hops: usize,
        /// Number of provider-to-provider pairs left to the provider graph.
        provider_pairs: usize,
    },
    /// Compilation finished successfully.
    CompileFinished {
        /// Number of sites with a definitions bundle.
        sites: usize,
        /// Number of input connections.
        connections: usize,
        /// Total number of broker objects across all bundles.
        objects: usize,
    },
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Receiver of compile audit events.
pub trait CompileAuditSink {
    /// Records an audit event.
    fn record(&self, event: &CompileAuditEvent);
}

/// Audit sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl CompileAuditSink for NoopAuditSink {
    fn record(&self, _event: &CompileAuditEvent) {}
}

impl<T: CompileAuditSink + ?Sized> CompileAuditSink for &T {
    fn record(&self, event: &CompileAuditEvent) {
        (**self).record(event);
    }
}
