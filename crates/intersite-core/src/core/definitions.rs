// crates/intersite-core/src/core/definitions.rs
// ============================================================================
// Module: Broker Definitions
// Description: Declarative broker objects grouped into per-site bundles.
// Purpose: Provide the boundary artifact handed to the broker reconciler.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Definitions`] bundle serializes in the broker's definitions import
//! format (`users`, `vhosts`, `permissions`, `exchanges`, `queues`,
//! `bindings`, `parameters`). Every collection is an ordered set, so inserting
//! an object twice is a no-op and serialization order never depends on the
//! order in which connections were supplied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::connection::DEFAULT_VHOST_NAME;
use crate::core::options::QueueArguments;

// ============================================================================
// SECTION: Identity Objects
// ============================================================================

/// Broker user authenticated through the external (certificate) mechanism.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct User {
    /// User name; equals the peer site identifier.
    pub name: String,
}

/// Broker virtual host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VirtualHost {
    /// Virtual host name.
    pub name: String,
}

/// Per-vhost access rights of a user, expressed as regex patterns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// User the permission applies to.
    pub user: String,
    /// Virtual host the permission applies to.
    pub vhost: String,
    /// Configure pattern (`^$` grants nothing).
    pub configure: String,
    /// Write pattern.
    pub write: String,
    /// Read pattern.
    pub read: String,
}

// ============================================================================
// SECTION: Routing Objects
// ============================================================================

/// Exchange type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeType {
    /// Topic exchange routing on dotted keys with `*`/`#` wildcards.
    Topic,
}

/// Durable topic exchange.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Exchange {
    /// Exchange name.
    pub name: String,
    /// Owning virtual host.
    pub vhost: String,
    /// Exchange type.
    #[serde(rename = "type")]
    pub kind: ExchangeType,
    /// Survives broker restarts.
    pub durable: bool,
    /// Deleted when the last binding goes away.
    pub auto_delete: bool,
    /// Internal exchanges reject direct publishes.
    pub internal: bool,
    /// Extra exchange arguments.
    pub arguments: BTreeMap<String, String>,
}

impl Exchange {
    /// Creates the durable topic exchange `name` in `vhost`.
    #[must_use]
    pub fn topic(name: impl Into<String>, vhost: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vhost: vhost.into(),
            kind: ExchangeType::Topic,
            durable: true,
            auto_delete: false,
            internal: false,
            arguments: BTreeMap::new(),
        }
    }
}

/// Durable queue buffering messages for one peer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Queue {
    /// Queue name.
    pub name: String,
    /// Owning virtual host.
    pub vhost: String,
    /// Survives broker restarts.
    pub durable: bool,
    /// Deleted when the last consumer goes away.
    pub auto_delete: bool,
    /// Queue arguments (TTL and size cap).
    pub arguments: QueueArguments,
}

impl Queue {
    /// Creates a durable queue.
    #[must_use]
    pub fn durable(
        name: impl Into<String>,
        vhost: impl Into<String>,
        arguments: QueueArguments,
    ) -> Self {
        Self {
            name: name.into(),
            vhost: vhost.into(),
            durable: true,
            auto_delete: false,
            arguments,
        }
    }
}

/// Binding destination kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationType {
    /// The destination is a queue.
    Queue,
}

/// Topic binding from an exchange to a queue.
///
/// # Invariants
/// - Identity is `(source, vhost, destination, routing_key)`; the remaining
///   fields are constant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Binding {
    /// Source exchange.
    pub source: String,
    /// Owning virtual host.
    pub vhost: String,
    /// Destination queue.
    pub destination: String,
    /// Destination kind.
    pub destination_type: DestinationType,
    /// Routing-key pattern.
    pub routing_key: String,
    /// Extra binding arguments.
    pub arguments: BTreeMap<String, String>,
}

impl Binding {
    /// Creates a binding from exchange `source` to queue `destination`.
    #[must_use]
    pub fn to_queue(
        source: impl Into<String>,
        vhost: impl Into<String>,
        destination: impl Into<String>,
        routing_key: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            vhost: vhost.into(),
            destination: destination.into(),
            destination_type: DestinationType::Queue,
            routing_key: routing_key.into(),
            arguments: BTreeMap::new(),
        }
    }
}

// ============================================================================
// SECTION: Relay Parameters
// ============================================================================

/// Runtime parameter component label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterComponent {
    /// Shovel relay process.
    Shovel,
}

/// Relay acknowledgement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AckMode {
    /// Acknowledge at the source only after the destination confirmed.
    OnConfirm,
}

/// Relay source deletion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteAfter {
    /// Keep the relay running; never delete it on disconnect.
    Never,
}

/// Shovel configuration value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShovelValue {
    /// Broker the relay consumes from.
    pub src_uri: String,
    /// Queue the relay consumes from.
    pub src_queue: String,
    /// Broker the relay publishes to.
    pub dest_uri: String,
    /// Exchange the relay publishes to.
    pub dest_exchange: String,
    /// Acknowledgement mode.
    pub ack_mode: AckMode,
    /// Deletion policy.
    pub src_delete_after: DeleteAfter,
}

/// Shovel relay moving messages from a source queue to a remote exchange.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Shovel {
    /// Virtual host owning the parameter.
    pub vhost: String,
    /// Parameter component.
    pub component: ParameterComponent,
    /// Relay name.
    pub name: String,
    /// Relay configuration.
    pub value: ShovelValue,
}

// ============================================================================
// SECTION: Definitions Bundle
// ============================================================================

/// Per-site aggregate of broker objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definitions {
    /// Peer users.
    pub users: BTreeSet<User>,
    /// Dedicated virtual hosts (the default vhost is never listed).
    pub vhosts: BTreeSet<VirtualHost>,
    /// User permissions.
    pub permissions: BTreeSet<Permission>,
    /// Topic exchanges in dedicated virtual hosts.
    pub exchanges: BTreeSet<Exchange>,
    /// Intersite queues.
    pub queues: BTreeSet<Queue>,
    /// Direct and multi-hop bindings.
    pub bindings: BTreeSet<Binding>,
    /// Shovel relay parameters.
    pub parameters: BTreeSet<Shovel>,
}

impl Definitions {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the bundle holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.vhosts.is_empty()
            && self.permissions.is_empty()
            && self.exchanges.is_empty()
            && self.queues.is_empty()
            && self.bindings.is_empty()
            && self.parameters.is_empty()
    }

    /// Returns the total number of objects in the bundle.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.users.len()
            + self.vhosts.len()
            + self.permissions.len()
            + self.exchanges.len()
            + self.queues.len()
            + self.bindings.len()
            + self.parameters.len()
    }

    /// Adds a virtual host; the default vhost is implicit and skipped.
    pub fn add_vhost(&mut self, name: &str) {
        if name != DEFAULT_VHOST_NAME {
            self.vhosts.insert(VirtualHost {
                name: name.to_string(),
            });
        }
    }

    /// Merges another bundle into this one (set union).
    pub fn merge(&mut self, other: Self) {
        self.users.extend(other.users);
        self.vhosts.extend(other.vhosts);
        self.permissions.extend(other.permissions);
        self.exchanges.extend(other.exchanges);
        self.queues.extend(other.queues);
        self.bindings.extend(other.bindings);
        self.parameters.extend(other.parameters);
    }

    /// Returns bindings installed in `vhost`.
    pub fn bindings_in<'a>(&'a self, vhost: &'a str) -> impl Iterator<Item = &'a Binding> + 'a {
        self.bindings.iter().filter(move |binding| binding.vhost == vhost)
    }
}
