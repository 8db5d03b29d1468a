// crates/intersite-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared connection builders and reference topologies.
// Purpose: Keep integration tests focused on expected broker objects.
// Dependencies: intersite-core
// ============================================================================

//! ## Overview
//! Connection builders plus the reference topologies used across the compile
//! tests: a single hop, a hop into a tenant, two remotes of one or two
//! tenants behind a provider hub, and fully meshed variants.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use intersite_core::Binding;
use intersite_core::Connectee;
use intersite_core::Connecter;
use intersite_core::Connection;
use intersite_core::Customer;
use intersite_core::DEFAULT_VHOST_NAME;
use intersite_core::SiteId;

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Default broker TLS port used by fixtures.
pub const FIXTURE_PORT: u16 = 5671;

/// Builds a connection whose connectee listens on `<to>.example.com:5671`.
pub fn connection(from: &str, from_customer: &str, to: &str, to_customer: &str) -> Connection {
    Connection::new(
        Connecter {
            site_id: SiteId::new(from),
            customer: Customer::from(from_customer),
        },
        Connectee {
            site_id: SiteId::new(to),
            customer: Customer::from(to_customer),
            hostname: format!("{to}.example.com"),
            port: FIXTURE_PORT,
        },
    )
}

/// Builds a site identifier.
pub fn site(id: &str) -> SiteId {
    SiteId::new(id)
}

/// Builds a binding on the default exchange toward `cmk.intersite.<through>`.
pub fn binding(vhost: &str, through: &str, destination: &str) -> Binding {
    Binding::to_queue(
        "cmk.intersite",
        vhost,
        format!("cmk.intersite.{through}"),
        format!("{destination}.#"),
    )
}

/// Builds a default-vhost binding toward `cmk.intersite.<through>`.
pub fn default_binding(through: &str, destination: &str) -> Binding {
    binding(DEFAULT_VHOST_NAME, through, destination)
}

/// Collects bindings into a set.
pub fn bindings<const N: usize>(items: [Binding; N]) -> BTreeSet<Binding> {
    items.into_iter().collect()
}

// ============================================================================
// SECTION: Reference Topologies
// ============================================================================

/// Provider hub connected to one provider remote.
pub fn simple() -> Vec<Connection> {
    vec![connection("central", "provider", "remote1", "provider")]
}

/// Provider hub connected to one remote of `customer1`.
pub fn simple_diff_customer() -> Vec<Connection> {
    vec![connection("central", "provider", "remote1", "customer1")]
}

/// Provider hub connected to two remotes of `customer1`.
pub fn multisite_same_customer() -> Vec<Connection> {
    vec![
        connection("central", "provider", "remote1", "customer1"),
        connection("central", "provider", "remote2", "customer1"),
    ]
}

/// Provider hub connected to remotes of two different customers.
pub fn multisite_diff_customer() -> Vec<Connection> {
    vec![
        connection("central", "provider", "remote1", "customer1"),
        connection("central", "provider", "remote2", "customer2"),
    ]
}

/// Two `customer1` remotes connected to each other and to the hub.
pub fn p2p_same_customer() -> Vec<Connection> {
    vec![
        connection("central", "provider", "remote1", "customer1"),
        connection("central", "provider", "remote2", "customer1"),
        connection("remote1", "customer1", "remote2", "customer1"),
    ]
}

/// Three provider sites meshed in a triangle.
pub fn p2p_provider() -> Vec<Connection> {
    vec![
        connection("central", "provider", "remote1", "provider"),
        connection("central", "provider", "remote2", "provider"),
        connection("remote1", "provider", "remote2", "provider"),
    ]
}
