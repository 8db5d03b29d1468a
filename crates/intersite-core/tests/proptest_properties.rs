// crates/intersite-core/tests/proptest_properties.rs
// ============================================================================
// Module: Topology Property-Based Tests
// Description: Property tests for compiler determinism and routing coverage.
// Purpose: Check compile invariants over randomly generated valid topologies.
// ============================================================================

//! Property-based tests for topology compiler invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;

use common::connection;
use intersite_core::CompileOptions;
use intersite_core::CompiledTopology;
use intersite_core::Connection;
use intersite_core::Customer;
use intersite_core::DEFAULT_VHOST_NAME;
use intersite_core::SiteId;
use intersite_core::TopologyCompiler;
use intersite_core::TopologyGraph;
use proptest::prelude::*;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// Site pool used by generated topologies.
const SITES: [&str; 6] = ["s0", "s1", "s2", "s3", "s4", "s5"];
/// Customer labels used by generated topologies.
const CUSTOMERS: [&str; 3] = ["provider", "t1", "t2"];

/// Generates valid connection lists: consistent customers, no tenant mixing.
fn topology_strategy() -> impl Strategy<Value = Vec<Connection>> {
    (
        prop::collection::vec(0 .. CUSTOMERS.len(), SITES.len()),
        prop::collection::vec((0 .. SITES.len(), 0 .. SITES.len(), any::<bool>()), 0 .. 14),
    )
        .prop_map(|(customers, edges)| {
            let mut connections = Vec::new();
            for (left, right, flip) in edges {
                let left_customer = CUSTOMERS[customers[left]];
                let right_customer = CUSTOMERS[customers[right]];
                if left == right {
                    continue;
                }
                if left_customer != "provider"
                    && right_customer != "provider"
                    && left_customer != right_customer
                {
                    continue;
                }
                let declared = if flip {
                    connection(SITES[right], right_customer, SITES[left], left_customer)
                } else {
                    connection(SITES[left], left_customer, SITES[right], right_customer)
                };
                connections.push(declared);
            }
            connections
        })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Compiles with default options.
fn compile(connections: &[Connection]) -> CompiledTopology {
    TopologyCompiler::new(CompileOptions::default()).compile(connections).unwrap()
}

/// Returns breadth-first hop distances from `start` over `edges`.
fn bfs(edges: &[(SiteId, SiteId)], start: &SiteId) -> BTreeMap<SiteId, usize> {
    let mut adjacency: BTreeMap<&SiteId, Vec<&SiteId>> = BTreeMap::new();
    for (left, right) in edges {
        adjacency.entry(left).or_default().push(right);
        adjacency.entry(right).or_default().push(left);
    }
    let mut distances = BTreeMap::from([(start.clone(), 0)]);
    let mut queue = VecDeque::from([start]);
    while let Some(site) = queue.pop_front() {
        let distance = distances[site];
        for next in adjacency.get(site).into_iter().flatten() {
            if !distances.contains_key(*next) {
                distances.insert((*next).clone(), distance + 1);
                queue.push_back(*next);
            }
        }
    }
    distances
}

/// Returns the customer declared for every site.
fn customers(connections: &[Connection]) -> BTreeMap<SiteId, Customer> {
    let mut customers = BTreeMap::new();
    for connection in connections {
        customers.insert(connection.connecter.site_id.clone(), connection.connecter.customer.clone());
        customers.insert(connection.connectee.site_id.clone(), connection.connectee.customer.clone());
    }
    customers
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn output_is_independent_of_declaration_order(
        connections in topology_strategy(),
        rotation in 0usize .. 14,
    ) {
        let expected = compile(&connections);
        let mut reversed = connections.clone();
        reversed.reverse();
        let mut rotated = connections.clone();
        if !rotated.is_empty() {
            let shift = rotation % rotated.len();
            rotated.rotate_left(shift);
        }
        let reversed_compiled = compile(&reversed);
        prop_assert_eq!(reversed_compiled.definitions(), expected.definitions());
        let rotated_compiled = compile(&rotated);
        prop_assert_eq!(rotated_compiled.definitions(), expected.definitions());
        prop_assert_eq!(compile(&rotated).digests().unwrap(), expected.digests().unwrap());
    }

    #[test]
    fn duplicated_input_is_idempotent(connections in topology_strategy()) {
        let mut doubled = connections.clone();
        doubled.extend(connections.iter().cloned());
        let doubled_compiled = compile(&doubled);
        let single_compiled = compile(&connections);
        prop_assert_eq!(doubled_compiled.definitions(), single_compiled.definitions());
    }

    #[test]
    fn paths_stay_within_their_tenant(connections in topology_strategy()) {
        let customers = customers(&connections);
        let compiled = compile(&connections);
        for (tenant, paths) in compiled.paths() {
            for (_, path) in paths.iter() {
                for site in path {
                    let customer = &customers[site];
                    prop_assert!(customer.is_provider() || customer == tenant);
                }
            }
        }
    }

    #[test]
    fn tenant_vhosts_only_route_to_their_tenant(connections in topology_strategy()) {
        let customers = customers(&connections);
        let compiled = compile(&connections);
        for bundle in compiled.definitions().values() {
            for binding in &bundle.bindings {
                if binding.vhost == DEFAULT_VHOST_NAME {
                    continue;
                }
                let destination = binding.routing_key.strip_suffix(".#").unwrap();
                let customer = &customers[&SiteId::new(destination)];
                prop_assert!(customer.is_provider() || customer.as_str() == binding.vhost);
            }
        }
    }

    #[test]
    fn relay_hops_have_bindings(connections in topology_strategy()) {
        let customers = customers(&connections);
        let compiled = compile(&connections);
        let options = CompileOptions::default();
        for (tenant, paths) in compiled.paths() {
            for ((origin, destination), path) in paths.iter() {
                if path.len() < 3 {
                    continue;
                }
                let provider_pair =
                    customers[origin].is_provider() && customers[destination].is_provider();
                if provider_pair && !tenant.is_provider() {
                    continue;
                }
                for window in path[.. path.len() - 1].windows(2) {
                    let (from, through) = (&window[0], &window[1]);
                    let bundle = compiled.site(from).unwrap();
                    let queue = options.queue_name(through);
                    let key = destination.routing_pattern();
                    prop_assert!(bundle
                        .bindings
                        .iter()
                        .any(|binding| binding.destination == queue && binding.routing_key == key));
                }
            }
        }
    }

    #[test]
    fn routing_key_selects_one_queue(connections in topology_strategy()) {
        let compiled = compile(&connections);
        for (site, bundle) in compiled.definitions() {
            let mut targets: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
            for binding in &bundle.bindings {
                targets
                    .entry((binding.vhost.as_str(), binding.routing_key.as_str()))
                    .or_default()
                    .insert(binding.destination.as_str());
            }
            for ((vhost, key), queues) in &targets {
                prop_assert!(
                    queues.len() == 1,
                    "{} binds {} in {} to {} queues",
                    site,
                    key,
                    vhost,
                    queues.len()
                );
            }
        }
    }

    #[test]
    fn paths_have_minimal_hop_count(connections in topology_strategy()) {
        let graph = TopologyGraph::build(&connections).unwrap();
        let compiled = compile(&connections);
        for (tenant, tenant_graph) in graph.tenants() {
            let edges = tenant_graph.edges();
            let paths = &compiled.paths()[tenant];
            for start in tenant_graph.sites() {
                let distances = bfs(&edges, start);
                for (end, distance) in &distances {
                    if end == start {
                        prop_assert!(paths.get(start, end).is_none());
                        continue;
                    }
                    prop_assert_eq!(paths.distance(start, end), Some(*distance));
                }
            }
        }
    }

    #[test]
    fn no_site_routes_to_itself(connections in topology_strategy()) {
        let compiled = compile(&connections);
        let options = CompileOptions::default();
        for paths in compiled.paths().values() {
            for (_, path) in paths.iter() {
                let unique: BTreeSet<&SiteId> = path.iter().collect();
                prop_assert_eq!(unique.len(), path.len());
            }
        }
        for (site, bundle) in compiled.definitions() {
            let own_queue = options.queue_name(site);
            prop_assert!(bundle.queues.iter().all(|queue| queue.name != own_queue));
            prop_assert!(bundle.bindings.iter().all(|binding| binding.destination != own_queue));
            prop_assert!(bundle.users.iter().all(|user| user.name != site.as_str()));
        }
    }
}
