// crates/intersite-core/src/runtime/mod.rs
// ============================================================================
// Module: Intersite Runtime
// Description: Graph building, path solving, provisioning and materialization.
// Purpose: Compile declared connections into per-site broker definitions.
// Dependencies: crate::{core, interfaces}, url
// ============================================================================

//! ## Overview
//! Runtime modules implement the compile pipeline. Every stage is a pure
//! function of its inputs so the same connection set always yields the same
//! definitions, regardless of declaration order.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod compiler;
pub mod graph;
pub mod materialize;
pub mod paths;
pub mod provision;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compiler::CompiledTopology;
pub use compiler::TopologyCompiler;
pub use compiler::compute_distributed_definitions;
pub use graph::TenantGraph;
pub use graph::TopologyGraph;
pub use materialize::HopRegistry;
pub use materialize::Materialized;
pub use materialize::RelayHop;
pub use materialize::SiteBinding;
pub use materialize::materialize_bindings;
pub use paths::ShortestPaths;
pub use paths::SitePair;
pub use paths::find_shortest_paths;
pub use provision::CONFIGURE_NOTHING;
pub use provision::ConnectionProvision;
pub use provision::QueueIndex;
pub use provision::provision_connection;
