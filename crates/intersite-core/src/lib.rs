// crates/intersite-core/src/lib.rs
// ============================================================================
// Module: Intersite Core Library
// Description: Public API surface for the intersite topology compiler.
// Purpose: Expose core types, audit interfaces and the compile pipeline.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Intersite core compiles a declarative list of site-to-site connections into
//! broker definitions for every participating site: peer users, permissions,
//! queues, topic bindings, dedicated tenant vhosts and shovel relays. Traffic
//! between sites that are not directly connected is routed along shortest
//! paths by installing relay bindings on every intermediate hop.
//!
//! The crate performs no I/O. Loading configuration and writing definitions
//! files is left to the host.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CompileAuditEvent;
pub use interfaces::CompileAuditSink;
pub use interfaces::NoopAuditSink;
pub use runtime::CompiledTopology;
pub use runtime::ShortestPaths;
pub use runtime::TenantGraph;
pub use runtime::TopologyCompiler;
pub use runtime::TopologyGraph;
pub use runtime::compute_distributed_definitions;
pub use runtime::find_shortest_paths;
