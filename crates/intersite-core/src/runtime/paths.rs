// crates/intersite-core/src/runtime/paths.rs
// ============================================================================
// Module: All-Pairs Shortest Path Solver
// Description: Round-based frontier expansion over a tenant graph.
// Purpose: Pick one minimum-hop site chain for every reachable ordered pair.
// Dependencies: crate::core, crate::runtime::graph
// ============================================================================

//! ## Overview
//! The solver seeds the mapping with every direct edge in both directions and
//! then grows paths by exactly one hop per round until a round discovers no
//! new pair. Because every path found in round `k` has `k` hops, the first
//! path recorded for a pair is a shortest one.
//!
//! Ties between equal-length paths are broken explicitly: the lexicographically
//! smallest site sequence wins. Combined with sorted adjacency, the result
//! depends only on the edge set, never on input order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::core::SiteId;
use crate::runtime::graph::TenantGraph;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Ordered `(start, end)` site pair.
pub type SitePair = (SiteId, SiteId);

/// Shortest paths between every reachable ordered pair of one tenant.
///
/// # Invariants
/// - Each path starts at the pair's start, ends at its end, and has at least
///   two sites.
/// - No site appears twice within a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortestPaths {
    /// Paths keyed by `(start, end)`.
    paths: BTreeMap<SitePair, Vec<SiteId>>,
}

impl ShortestPaths {
    /// Solves all pairs of `graph`.
    #[must_use]
    pub fn solve(graph: &TenantGraph) -> Self {
        let mut paths: BTreeMap<SitePair, Vec<SiteId>> = BTreeMap::new();
        let mut frontier: Vec<SitePair> = Vec::new();
        for site in graph.sites() {
            for neighbor in graph.neighbors(site) {
                let pair = (site.clone(), neighbor.clone());
                paths.insert(pair.clone(), vec![site.clone(), neighbor.clone()]);
                frontier.push(pair);
            }
        }

        // Only paths added in the previous round can propose new pairs: an
        // older path had its extensions proposed in the round after it appeared.
        while !frontier.is_empty() {
            let mut proposals: BTreeMap<SitePair, Vec<SiteId>> = BTreeMap::new();
            for pair in &frontier {
                let Some(path) = paths.get(pair) else {
                    continue;
                };
                for next in graph.neighbors(&pair.1) {
                    if path.contains(next) {
                        continue;
                    }
                    let candidate_pair = (pair.0.clone(), next.clone());
                    if paths.contains_key(&candidate_pair) {
                        continue;
                    }
                    let mut candidate = path.clone();
                    candidate.push(next.clone());
                    match proposals.entry(candidate_pair) {
                        Entry::Vacant(entry) => {
                            entry.insert(candidate);
                        }
                        Entry::Occupied(mut entry) => {
                            if candidate < *entry.get() {
                                entry.insert(candidate);
                            }
                        }
                    }
                }
            }
            frontier = proposals.keys().cloned().collect();
            paths.extend(proposals);
        }

        Self {
            paths,
        }
    }

    /// Returns the path from `start` to `end`, if reachable.
    #[must_use]
    pub fn get(&self, start: &SiteId, end: &SiteId) -> Option<&[SiteId]> {
        self.paths.get(&(start.clone(), end.clone())).map(Vec::as_slice)
    }

    /// Returns the hop count between `start` and `end`, if reachable.
    #[must_use]
    pub fn distance(&self, start: &SiteId, end: &SiteId) -> Option<usize> {
        self.get(start, end).map(|path| path.len() - 1)
    }

    /// Iterates over all paths in pair order.
    pub fn iter(&self) -> impl Iterator<Item = (&SitePair, &[SiteId])> {
        self.paths.iter().map(|(pair, path)| (pair, path.as_slice()))
    }

    /// Returns the number of reachable ordered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true when no pair is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns the underlying mapping.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<SitePair, Vec<SiteId>> {
        &self.paths
    }
}

/// Solves shortest paths over raw undirected edges.
#[must_use]
pub fn find_shortest_paths<S: Into<SiteId>>(
    edges: impl IntoIterator<Item = (S, S)>,
) -> ShortestPaths {
    ShortestPaths::solve(&TenantGraph::from_edges(edges))
}
