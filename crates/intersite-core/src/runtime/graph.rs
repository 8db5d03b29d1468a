// crates/intersite-core/src/runtime/graph.rs
// ============================================================================
// Module: Topology Graph Builder
// Description: Validates connections and partitions them into tenant graphs.
// Purpose: Produce undirected adjacency per tenant for the path solver.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Every connection contributes one undirected edge to the graph of its
//! effective tenant. Relays are bidirectional, so edge direction is dropped.
//! All configuration errors are detected here, before any definitions are
//! emitted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::btree_map::Entry;

use crate::core::CompileError;
use crate::core::Connection;
use crate::core::Customer;
use crate::core::SiteId;

// ============================================================================
// SECTION: Tenant Graph
// ============================================================================

/// Undirected, unweighted site graph of one tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantGraph {
    /// Sorted neighbor sets keyed by site.
    adjacency: BTreeMap<SiteId, BTreeSet<SiteId>>,
}

impl TenantGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from raw edge pairs; self-loops are ignored.
    pub fn from_edges<S: Into<SiteId>>(edges: impl IntoIterator<Item = (S, S)>) -> Self {
        let mut graph = Self::new();
        for (left, right) in edges {
            graph.add_edge(left.into(), right.into());
        }
        graph
    }

    /// Adds an undirected edge.
    pub fn add_edge(&mut self, left: SiteId, right: SiteId) {
        if left == right {
            return;
        }
        self.adjacency.entry(left.clone()).or_default().insert(right.clone());
        self.adjacency.entry(right).or_default().insert(left);
    }

    /// Returns the sorted neighbors of `site`.
    pub fn neighbors<'a>(&'a self, site: &SiteId) -> impl Iterator<Item = &'a SiteId> + use<'a> {
        self.adjacency.get(site).into_iter().flatten()
    }

    /// Returns the sites of the graph in sorted order.
    pub fn sites(&self) -> impl Iterator<Item = &SiteId> {
        self.adjacency.keys()
    }

    /// Returns the number of sites.
    #[must_use]
    pub fn site_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Returns each undirected edge once, smaller site first.
    #[must_use]
    pub fn edges(&self) -> Vec<(SiteId, SiteId)> {
        let mut edges = Vec::new();
        for (site, neighbors) in &self.adjacency {
            for neighbor in neighbors.iter().filter(|neighbor| *neighbor > site) {
                edges.push((site.clone(), neighbor.clone()));
            }
        }
        edges
    }
}

// ============================================================================
// SECTION: Topology Graph
// ============================================================================

/// Validated topology partitioned by effective tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyGraph {
    /// Tenant graphs keyed by effective tenant.
    tenants: BTreeMap<Customer, TenantGraph>,
    /// Every site that appears in any connection.
    sites: BTreeSet<SiteId>,
    /// Sites declared with the provider customer.
    providers: BTreeSet<SiteId>,
}

impl TopologyGraph {
    /// Validates `connections` and builds the per-tenant graphs.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when a connection connects a site to itself,
    /// mixes two concrete tenants, redeclares a site with another customer,
    /// or redeclares a connection with another address.
    pub fn build(connections: &[Connection]) -> Result<Self, CompileError> {
        let mut customers: BTreeMap<&SiteId, &Customer> = BTreeMap::new();
        let mut addresses: BTreeMap<(&SiteId, &SiteId), (&str, u16)> = BTreeMap::new();
        let mut graph = Self::default();

        for connection in connections {
            let connecter = &connection.connecter;
            let connectee = &connection.connectee;
            if connecter.site_id == connectee.site_id {
                return Err(CompileError::SelfConnection {
                    site: connecter.site_id.clone(),
                });
            }
            let tenant = connection.tenant()?;
            record_customer(&mut customers, &connecter.site_id, &connecter.customer)?;
            record_customer(&mut customers, &connectee.site_id, &connectee.customer)?;

            let address = (connectee.hostname.as_str(), connectee.port);
            match addresses.entry((&connecter.site_id, &connectee.site_id)) {
                Entry::Vacant(entry) => {
                    entry.insert(address);
                }
                Entry::Occupied(entry) if *entry.get() != address => {
                    return Err(CompileError::ConflictingAddress {
                        connecter: connecter.site_id.clone(),
                        connectee: connectee.site_id.clone(),
                    });
                }
                Entry::Occupied(_) => {}
            }

            graph.sites.insert(connecter.site_id.clone());
            graph.sites.insert(connectee.site_id.clone());
            graph
                .tenants
                .entry(tenant)
                .or_default()
                .add_edge(connecter.site_id.clone(), connectee.site_id.clone());
        }
        graph.providers = customers
            .into_iter()
            .filter(|(_, customer)| customer.is_provider())
            .map(|(site, _)| site.clone())
            .collect();
        Ok(graph)
    }

    /// Returns the tenant graphs in tenant order.
    pub fn tenants(&self) -> impl Iterator<Item = (&Customer, &TenantGraph)> {
        self.tenants.iter()
    }

    /// Returns the graph of one tenant.
    #[must_use]
    pub fn tenant(&self, tenant: &Customer) -> Option<&TenantGraph> {
        self.tenants.get(tenant)
    }

    /// Returns every site that appears in any connection.
    #[must_use]
    pub const fn sites(&self) -> &BTreeSet<SiteId> {
        &self.sites
    }

    /// Returns the sites declared with the provider customer.
    #[must_use]
    pub const fn providers(&self) -> &BTreeSet<SiteId> {
        &self.providers
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Records the customer of a site, rejecting a conflicting redeclaration.
fn record_customer<'a>(
    customers: &mut BTreeMap<&'a SiteId, &'a Customer>,
    site: &'a SiteId,
    customer: &'a Customer,
) -> Result<(), CompileError> {
    match customers.entry(site) {
        Entry::Vacant(entry) => {
            entry.insert(customer);
            Ok(())
        }
        Entry::Occupied(entry) if *entry.get() != customer => {
            Err(CompileError::InconsistentCustomer {
                site: site.clone(),
                first: (*entry.get()).clone(),
                second: customer.clone(),
            })
        }
        Entry::Occupied(_) => Ok(()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
