// crates/intersite-core/src/runtime/materialize.rs
// ============================================================================
// Module: Binding Materializer
// Description: Multi-hop topic bindings derived from shortest paths.
// Purpose: Let every hop forward by routing key using local bindings only.
// Dependencies: crate::core, crate::runtime::{paths, provision}
// ============================================================================

//! ## Overview
//! For a path `[s0, s1, ..., sn]` with at least one intermediate hop, every
//! site `si` before the last hop gets a binding from its exchange to the queue
//! toward `s(i+1)` with routing key `<sn>.#`. The last hop is already covered
//! by the direct binding of the connection between `s(n-1)` and `sn`.
//!
//! A relay hop is identified by `(from, to, through)`; the [`HopRegistry`]
//! makes sure a hop shared by several paths is emitted once.
//!
//! Provider sites appear in every tenant graph they serve. A path between two
//! provider sites is only materialized from the provider graph, so provider
//! traffic never relays through a tenant's sites and every destination keeps
//! a single route per origin.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::Binding;
use crate::core::CompileOptions;
use crate::core::Customer;
use crate::core::SiteId;
use crate::runtime::paths::ShortestPaths;
use crate::runtime::provision::QueueIndex;

// ============================================================================
// SECTION: Relay Hops
// ============================================================================

/// Logical relay hop: `from` forwards traffic addressed to `to` via `through`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelayHop {
    /// Site installing the binding.
    pub from: SiteId,
    /// Final destination addressed by the routing key.
    pub to: SiteId,
    /// Next hop whose queue receives the traffic.
    pub through: SiteId,
}

/// Dedup registry of relay hops emitted during one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HopRegistry {
    /// Hops emitted so far.
    seen: BTreeSet<RelayHop>,
}

impl HopRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hop`; returns false when it was already emitted.
    pub fn register(&mut self, hop: RelayHop) -> bool {
        self.seen.insert(hop)
    }

    /// Returns true when `hop` was already emitted.
    #[must_use]
    pub fn contains(&self, hop: &RelayHop) -> bool {
        self.seen.contains(hop)
    }

    /// Returns the number of emitted hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true when no hop was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// ============================================================================
// SECTION: Materialization
// ============================================================================

/// Binding to install on one site's broker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SiteBinding {
    /// Site whose broker receives the binding.
    pub site: SiteId,
    /// The binding itself.
    pub binding: Binding,
}

/// Outcome of materializing one tenant's paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Materialized {
    /// Newly emitted bindings.
    pub bindings: Vec<SiteBinding>,
    /// Hops skipped because another path already emitted them.
    pub skipped_hops: usize,
    /// Provider-to-provider pairs left to the provider graph.
    pub provider_pairs: usize,
}

/// Emits the multi-hop bindings for the `paths` of `tenant`'s graph.
///
/// `registry` is shared across tenants of one compilation so a hop reached
/// through several shortest paths is only emitted once. `providers` lists the
/// provider sites; their mutual paths are skipped unless `tenant` is the
/// provider graph itself.
#[must_use]
pub fn materialize_bindings(
    tenant: &Customer,
    paths: &ShortestPaths,
    providers: &BTreeSet<SiteId>,
    queues: &QueueIndex,
    options: &CompileOptions,
    registry: &mut HopRegistry,
) -> Materialized {
    let mut outcome = Materialized::default();
    for ((origin, destination), path) in paths.iter() {
        if path.len() < 3 {
            continue;
        }
        if !tenant.is_provider() && providers.contains(origin) && providers.contains(destination) {
            outcome.provider_pairs += 1;
            continue;
        }
        for window in path[.. path.len() - 1].windows(2) {
            let [from, through] = window else {
                continue;
            };
            let hop = RelayHop {
                from: from.clone(),
                to: destination.clone(),
                through: through.clone(),
            };
            if !registry.register(hop) {
                outcome.skipped_hops += 1;
                continue;
            }
            // Every graph edge has a provisioned queue on both ends.
            let Some(vhost) = queues.vhost(from, through) else {
                continue;
            };
            outcome.bindings.push(SiteBinding {
                site: from.clone(),
                binding: Binding::to_queue(
                    &options.exchange,
                    vhost,
                    options.queue_name(through),
                    destination.routing_pattern(),
                ),
            });
        }
    }
    outcome
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::paths::find_shortest_paths;

    /// Returns a queue index with default-vhost queues on both ends of each edge.
    fn index(edges: &[(&str, &str)]) -> QueueIndex {
        let mut index = QueueIndex::new();
        for (left, right) in edges {
            index.record(&SiteId::new(*left), &SiteId::new(*right), "/", true);
            index.record(&SiteId::new(*right), &SiteId::new(*left), "/", false);
        }
        index
    }

    #[test]
    fn direct_edges_need_no_relay_bindings() {
        let edges = [("a", "b")];
        let paths = find_shortest_paths(edges);
        let mut registry = HopRegistry::new();
        let outcome = materialize_bindings(
            &Customer::Provider,
            &paths,
            &BTreeSet::new(),
            &index(&edges),
            &CompileOptions::default(),
            &mut registry,
        );
        assert!(outcome.bindings.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn shared_relay_hop_is_emitted_once() {
        let edges = [("a", "b"), ("b", "c"), ("c", "d")];
        let paths = find_shortest_paths(edges);
        let mut registry = HopRegistry::new();
        let outcome = materialize_bindings(
            &Customer::Provider,
            &paths,
            &BTreeSet::new(),
            &index(&edges),
            &CompileOptions::default(),
            &mut registry,
        );
        // a->c, a->d (two hops), c->a, d->a (one new hop), d->b; b->d reuses a->d's hop.
        assert_eq!(outcome.bindings.len(), 6);
        assert_eq!(outcome.skipped_hops, 2);
        let relay_via_b = RelayHop {
            from: SiteId::new("b"),
            to: SiteId::new("d"),
            through: SiteId::new("c"),
        };
        assert!(registry.contains(&relay_via_b));
    }

    #[test]
    fn rerun_with_same_registry_emits_nothing() {
        let edges = [("a", "b"), ("b", "c")];
        let paths = find_shortest_paths(edges);
        let queues = index(&edges);
        let options = CompileOptions::default();
        let mut registry = HopRegistry::new();
        let tenant = Customer::tenant("acme");
        let providers = BTreeSet::new();
        let first =
            materialize_bindings(&tenant, &paths, &providers, &queues, &options, &mut registry);
        let second =
            materialize_bindings(&tenant, &paths, &providers, &queues, &options, &mut registry);
        assert_eq!(first.bindings.len(), 2);
        assert!(second.bindings.is_empty());
        assert_eq!(second.skipped_hops, 2);
    }

    #[test]
    fn provider_pairs_are_left_to_provider_graph() {
        // p1 - a - p3 inside one tenant graph: only the tenant site is routed.
        let edges = [("a", "p1"), ("a", "p3")];
        let paths = find_shortest_paths(edges);
        let providers = BTreeSet::from([SiteId::new("p1"), SiteId::new("p3")]);
        let queues = index(&edges);
        let options = CompileOptions::default();

        let mut registry = HopRegistry::new();
        let tenant = materialize_bindings(
            &Customer::tenant("acme"),
            &paths,
            &providers,
            &queues,
            &options,
            &mut registry,
        );
        assert!(tenant.bindings.is_empty());
        assert_eq!(tenant.provider_pairs, 2);

        let mut registry = HopRegistry::new();
        let provider = materialize_bindings(
            &Customer::Provider,
            &paths,
            &providers,
            &queues,
            &options,
            &mut registry,
        );
        assert_eq!(provider.bindings.len(), 2);
        assert_eq!(provider.provider_pairs, 0);
    }
}
