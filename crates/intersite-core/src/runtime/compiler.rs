// crates/intersite-core/src/runtime/compiler.rs
// ============================================================================
// Module: Topology Compiler
// Description: Orchestrates graph building, provisioning and materialization.
// Purpose: Turn declared connections into per-site broker definitions.
// Dependencies: crate::{core, interfaces}, crate::runtime::{graph, paths,
//               provision, materialize}
// ============================================================================

//! ## Overview
//! Compilation is a pure, single-pass pipeline:
//!
//! 1. validate every connection and partition edges by effective tenant,
//! 2. provision the direct objects of each connection on both ends,
//! 3. solve shortest paths per tenant graph,
//! 4. materialize relay bindings for multi-hop paths,
//! 5. merge everything into one bundle per site.
//!
//! The first error aborts the call and no partial output is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::CompileError;
use crate::core::CompileOptions;
use crate::core::Connection;
use crate::core::Customer;
use crate::core::Definitions;
use crate::core::DefinitionsDigest;
use crate::core::HashError;
use crate::core::SiteId;
use crate::core::hashing::definitions_digest;
use crate::interfaces::CompileAuditEvent;
use crate::interfaces::CompileAuditSink;
use crate::interfaces::NoopAuditSink;
use crate::runtime::graph::TopologyGraph;
use crate::runtime::materialize::HopRegistry;
use crate::runtime::materialize::materialize_bindings;
use crate::runtime::paths::ShortestPaths;
use crate::runtime::provision::QueueIndex;
use crate::runtime::provision::provision_connection;

// ============================================================================
// SECTION: Compiled Topology
// ============================================================================

/// Result of one successful compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledTopology {
    /// Definitions bundle per site.
    definitions: BTreeMap<SiteId, Definitions>,
    /// Shortest paths per effective tenant.
    paths: BTreeMap<Customer, ShortestPaths>,
}

impl CompiledTopology {
    /// Returns the definitions bundle of every site.
    #[must_use]
    pub const fn definitions(&self) -> &BTreeMap<SiteId, Definitions> {
        &self.definitions
    }

    /// Consumes the result and returns the per-site bundles.
    #[must_use]
    pub fn into_definitions(self) -> BTreeMap<SiteId, Definitions> {
        self.definitions
    }

    /// Returns the shortest paths of every tenant graph.
    #[must_use]
    pub const fn paths(&self) -> &BTreeMap<Customer, ShortestPaths> {
        &self.paths
    }

    /// Returns the bundle of one site.
    #[must_use]
    pub fn site(&self, site: &SiteId) -> Option<&Definitions> {
        self.definitions.get(site)
    }

    /// Returns the canonical JSON digest of every site bundle.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when a bundle cannot be canonicalized.
    pub fn digests(&self) -> Result<BTreeMap<SiteId, DefinitionsDigest>, HashError> {
        self.definitions
            .iter()
            .map(|(site, definitions)| {
                definitions_digest(definitions).map(|digest| (site.clone(), digest))
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// Topology compiler bound to naming options and an audit sink.
#[derive(Debug, Clone, Default)]
pub struct TopologyCompiler<A = NoopAuditSink> {
    /// Naming and queue options.
    options: CompileOptions,
    /// Audit sink receiving compile events.
    audit: A,
}

impl TopologyCompiler<NoopAuditSink> {
    /// Creates a compiler that records no audit events.
    #[must_use]
    pub const fn new(options: CompileOptions) -> Self {
        Self {
            options,
            audit: NoopAuditSink,
        }
    }
}

impl<A> TopologyCompiler<A>
where
    A: CompileAuditSink,
{
    /// Creates a compiler reporting to `audit`.
    #[must_use]
    pub const fn with_audit(options: CompileOptions, audit: A) -> Self {
        Self {
            options,
            audit,
        }
    }

    /// Compiles `connections` into per-site definitions.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] for the first invalid connection.
    pub fn compile(&self, connections: &[Connection]) -> Result<CompiledTopology, CompileError> {
        self.run(connections).inspect_err(|err| {
            self.audit.record(&CompileAuditEvent::ConnectionRejected {
                reason: err.kind().to_string(),
                message: err.to_string(),
            });
        })
    }

    /// Runs the pipeline without reporting failures.
    fn run(&self, connections: &[Connection]) -> Result<CompiledTopology, CompileError> {
        let graph = TopologyGraph::build(connections)?;

        let mut definitions: BTreeMap<SiteId, Definitions> =
            graph.sites().iter().map(|site| (site.clone(), Definitions::new())).collect();
        let mut queues = QueueIndex::new();
        for connection in connections {
            let provision = provision_connection(connection, &self.options)?;
            provision.index_queues(&mut queues);
            definitions
                .entry(provision.connecter)
                .or_default()
                .merge(provision.connecter_definitions);
            definitions
                .entry(provision.connectee)
                .or_default()
                .merge(provision.connectee_definitions);
        }

        let mut registry = HopRegistry::new();
        let mut paths = BTreeMap::new();
        for (tenant, tenant_graph) in graph.tenants() {
            let solved = ShortestPaths::solve(tenant_graph);
            self.audit.record(&CompileAuditEvent::TenantSolved {
                tenant: tenant.clone(),
                sites: tenant_graph.site_count(),
                edges: tenant_graph.edge_count(),
                paths: solved.len(),
            });

            let materialized = materialize_bindings(
                tenant,
                &solved,
                graph.providers(),
                &queues,
                &self.options,
                &mut registry,
            );
            self.audit.record(&CompileAuditEvent::BindingsMaterialized {
                tenant: tenant.clone(),
                bindings: materialized.bindings.len(),
                skipped_hops: materialized.skipped_hops,
                provider_pairs: materialized.provider_pairs,
            });
            for relay in materialized.bindings {
                definitions.entry(relay.site).or_default().bindings.insert(relay.binding);
            }
            paths.insert(tenant.clone(), solved);
        }

        self.audit.record(&CompileAuditEvent::CompileFinished {
            sites: definitions.len(),
            connections: connections.len(),
            objects: definitions.values().map(Definitions::object_count).sum(),
        });
        Ok(CompiledTopology {
            definitions,
            paths,
        })
    }
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Compiles `connections` into per-site definitions without auditing.
///
/// # Errors
///
/// Returns [`CompileError`] for the first invalid connection.
pub fn compute_distributed_definitions(
    connections: &[Connection],
    options: &CompileOptions,
) -> Result<BTreeMap<SiteId, Definitions>, CompileError> {
    TopologyCompiler::new(options.clone())
        .compile(connections)
        .map(CompiledTopology::into_definitions)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
