// crates/intersite-core/src/runtime/provision.rs
// ============================================================================
// Module: Per-Connection Provisioner
// Description: Base broker objects for one direct connection.
// Purpose: Emit identities, permissions, queues, direct bindings and relays.
// Dependencies: crate::core, url
// ============================================================================

//! ## Overview
//! Each connection yields one contribution for the connecter and one for the
//! connectee. The connecter side lives in the default vhost for same-customer
//! connections and in the tenant's dedicated vhost otherwise; the connectee
//! side always lives in the default vhost and only receives a reciprocal
//! direct binding when both ends share a customer.
//!
//! Output is a pure function of the connection and options: no generated IDs,
//! no timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use url::Url;
use url::form_urlencoded;

use crate::core::AckMode;
use crate::core::Binding;
use crate::core::CompileError;
use crate::core::CompileOptions;
use crate::core::Connection;
use crate::core::DEFAULT_VHOST_NAME;
use crate::core::DeleteAfter;
use crate::core::Definitions;
use crate::core::Exchange;
use crate::core::ParameterComponent;
use crate::core::Permission;
use crate::core::Queue;
use crate::core::Shovel;
use crate::core::ShovelValue;
use crate::core::SiteId;
use crate::core::User;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Configure pattern granting no configure rights.
pub const CONFIGURE_NOTHING: &str = "^$";

// ============================================================================
// SECTION: Queue Index
// ============================================================================

/// Virtual host of each site's queue toward each neighbor.
///
/// The materializer installs a multi-hop binding next to the queue it targets,
/// so it needs to know which vhost holds `<queue_prefix>.<neighbor>` on a site.
/// When a pair is connected in both directions the site holds two such queues;
/// the one drained by its own outbound relay wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueIndex {
    /// Vhost and outbound flag keyed by `(site, neighbor)`.
    vhosts: BTreeMap<(SiteId, SiteId), (String, bool)>,
}

impl QueueIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the vhost of `site`'s queue toward `neighbor`.
    ///
    /// `outbound` marks queues drained by a relay running on `site`; such a
    /// record replaces an inbound one, otherwise the first record is kept.
    pub fn record(&mut self, site: &SiteId, neighbor: &SiteId, vhost: &str, outbound: bool) {
        match self.vhosts.entry((site.clone(), neighbor.clone())) {
            Entry::Vacant(entry) => {
                entry.insert((vhost.to_string(), outbound));
            }
            Entry::Occupied(mut entry) => {
                if outbound && !entry.get().1 {
                    entry.insert((vhost.to_string(), outbound));
                }
            }
        }
    }

    /// Returns the vhost of `site`'s queue toward `neighbor`.
    #[must_use]
    pub fn vhost(&self, site: &SiteId, neighbor: &SiteId) -> Option<&str> {
        self.vhosts.get(&(site.clone(), neighbor.clone())).map(|(vhost, _)| vhost.as_str())
    }
}

// ============================================================================
// SECTION: Connection Provision
// ============================================================================

/// Broker objects contributed by one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProvision {
    /// Connecter site.
    pub connecter: SiteId,
    /// Objects installed on the connecter's broker.
    pub connecter_definitions: Definitions,
    /// Vhost holding the connecter-side objects.
    pub connecter_vhost: String,
    /// Connectee site.
    pub connectee: SiteId,
    /// Objects installed on the connectee's broker.
    pub connectee_definitions: Definitions,
}

impl ConnectionProvision {
    /// Records both queues of this connection in `index`.
    pub fn index_queues(&self, index: &mut QueueIndex) {
        index.record(&self.connecter, &self.connectee, &self.connecter_vhost, true);
        index.record(&self.connectee, &self.connecter, DEFAULT_VHOST_NAME, false);
    }
}

/// Emits the base broker objects for one connection.
///
/// # Errors
///
/// Returns [`CompileError::ConflictingTenants`] when the ends mix tenants and
/// [`CompileError::InvalidAddress`] when the connectee address cannot form a
/// broker URI.
pub fn provision_connection(
    connection: &Connection,
    options: &CompileOptions,
) -> Result<ConnectionProvision, CompileError> {
    let connecter = &connection.connecter.site_id;
    let connectee = &connection.connectee.site_id;
    let vhost = connection.connecter_vhost()?;
    let remote_uri = remote_uri(connection, options)?;
    let local_uri = local_uri(&vhost);

    let mut near = peer_definitions(connectee, &vhost, options);
    near.add_vhost(&vhost);
    if vhost != DEFAULT_VHOST_NAME {
        near.exchanges.insert(Exchange::topic(&options.exchange, &vhost));
    }
    near.bindings.insert(Binding::to_queue(
        &options.exchange,
        &vhost,
        options.queue_name(connectee),
        connectee.routing_pattern(),
    ));
    near.parameters.insert(shovel(
        &vhost,
        options.shovel_name(connecter, connectee),
        ShovelValue {
            src_uri: local_uri.clone(),
            src_queue: options.queue_name(connectee),
            dest_uri: remote_uri.clone(),
            dest_exchange: options.exchange.clone(),
            ack_mode: AckMode::OnConfirm,
            src_delete_after: DeleteAfter::Never,
        },
    ));
    near.parameters.insert(shovel(
        &vhost,
        options.shovel_name(connectee, connecter),
        ShovelValue {
            src_uri: remote_uri,
            src_queue: options.queue_name(connecter),
            dest_uri: local_uri,
            dest_exchange: options.exchange.clone(),
            ack_mode: AckMode::OnConfirm,
            src_delete_after: DeleteAfter::Never,
        },
    ));

    let mut far = peer_definitions(connecter, DEFAULT_VHOST_NAME, options);
    if connection.shares_customer() {
        far.bindings.insert(Binding::to_queue(
            &options.exchange,
            DEFAULT_VHOST_NAME,
            options.queue_name(connecter),
            connecter.routing_pattern(),
        ));
    }

    Ok(ConnectionProvision {
        connecter: connecter.clone(),
        connecter_definitions: near,
        connecter_vhost: vhost,
        connectee: connectee.clone(),
        connectee_definitions: far,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the user, permission and queue granted to `peer` in `vhost`.
fn peer_definitions(peer: &SiteId, vhost: &str, options: &CompileOptions) -> Definitions {
    let mut definitions = Definitions::new();
    definitions.users.insert(User {
        name: peer.as_str().to_string(),
    });
    definitions.permissions.insert(Permission {
        user: peer.as_str().to_string(),
        vhost: vhost.to_string(),
        configure: CONFIGURE_NOTHING.to_string(),
        write: options.exchange.clone(),
        read: options.read_pattern(),
    });
    definitions.queues.insert(Queue::durable(
        options.queue_name(peer),
        vhost,
        options.queue_arguments,
    ));
    definitions
}

/// Builds a shovel parameter.
fn shovel(vhost: &str, name: String, value: ShovelValue) -> Shovel {
    Shovel {
        vhost: vhost.to_string(),
        component: ParameterComponent::Shovel,
        name,
        value,
    }
}

/// Returns the URI of the local broker scoped to `vhost`.
fn local_uri(vhost: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(vhost.as_bytes()).collect();
    format!("amqp:///{encoded}")
}

/// Returns the mutual-TLS URI of the connectee's broker.
///
/// The server name is pinned to the connectee's site id and authentication
/// uses the external (certificate) mechanism, so no password is involved.
fn remote_uri(connection: &Connection, options: &CompileOptions) -> Result<String, CompileError> {
    let connectee = &connection.connectee;
    let base = format!("amqps://{}:{}", connectee.hostname, connectee.port);
    let mut url = Url::parse(&base).map_err(|err| CompileError::InvalidAddress {
        connectee: connectee.site_id.clone(),
        reason: err.to_string(),
    })?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("server_name_indication", connectee.site_id.as_str());
        query.append_pair("auth_mechanism", "external");
        for (key, value) in options.tls.query_pairs() {
            query.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
