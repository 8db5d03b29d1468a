// crates/intersite-core/src/core/connection.rs
// ============================================================================
// Module: Intersite Connections
// Description: Customer labels, connection endpoints and topology errors.
// Purpose: Model pairwise trust relationships between sites.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Connection`] is an ordered pair: the [`Connecter`] dials out and the
//! [`Connectee`] is dialed at its network address. Each end carries a
//! [`Customer`]; the reserved `"provider"` label is lifted into an explicit
//! variant so the "at most one side may be the provider hub" rule is checked
//! on the type rather than by string comparison.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::SiteId;
use crate::core::identifiers::TenantId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Serialized label of the provider pseudo-tenant.
pub const PROVIDER_LABEL: &str = "provider";

/// Name of the broker's default virtual host.
pub const DEFAULT_VHOST_NAME: &str = "/";

// ============================================================================
// SECTION: Customer
// ============================================================================

/// Tenant affiliation of a site.
///
/// # Invariants
/// - `Provider` serializes as `"provider"`; every other label is a tenant.
/// - An omitted label deserializes to `Provider`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Customer {
    /// Hub not tied to a specific tenant; may bridge any tenant's traffic.
    #[default]
    Provider,
    /// Concrete tenant.
    Tenant(TenantId),
}

impl Customer {
    /// Creates a tenant customer.
    #[must_use]
    pub fn tenant(id: impl Into<TenantId>) -> Self {
        Self::Tenant(id.into())
    }

    /// Returns true for the provider pseudo-tenant.
    #[must_use]
    pub const fn is_provider(&self) -> bool {
        matches!(self, Self::Provider)
    }

    /// Returns the serialized label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Provider => PROVIDER_LABEL,
            Self::Tenant(id) => id.as_str(),
        }
    }
}

impl From<String> for Customer {
    fn from(value: String) -> Self {
        if value == PROVIDER_LABEL { Self::Provider } else { Self::Tenant(TenantId::new(value)) }
    }
}

impl From<&str> for Customer {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Customer> for String {
    fn from(value: Customer) -> Self {
        match value {
            Customer::Provider => PROVIDER_LABEL.to_string(),
            Customer::Tenant(id) => id.as_str().to_string(),
        }
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Endpoints
// ============================================================================

/// Near end of a connection; dials out and is always locally reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Connecter {
    /// Site identifier.
    pub site_id: SiteId,
    /// Tenant affiliation (defaults to the provider hub).
    #[serde(default)]
    pub customer: Customer,
}

/// Remote end of a connection, dialed at `hostname:port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Connectee {
    /// Site identifier.
    pub site_id: SiteId,
    /// Tenant affiliation (defaults to the provider hub).
    #[serde(default)]
    pub customer: Customer,
    /// Broker hostname of the remote site.
    pub hostname: String,
    /// Broker TLS port of the remote site.
    pub port: u16,
}

// ============================================================================
// SECTION: Connection
// ============================================================================

/// Configured trust relationship between two sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Connection {
    /// Dialing end.
    pub connecter: Connecter,
    /// Dialed end.
    pub connectee: Connectee,
}

impl Connection {
    /// Builds a connection from its two ends.
    #[must_use]
    pub const fn new(connecter: Connecter, connectee: Connectee) -> Self {
        Self {
            connecter,
            connectee,
        }
    }

    /// Returns true when both ends declare the same customer.
    #[must_use]
    pub fn shares_customer(&self) -> bool {
        self.connecter.customer == self.connectee.customer
    }

    /// Resolves the effective tenant of the connection.
    ///
    /// The common customer wins when both ends agree; otherwise the end that
    /// is not the provider hub determines the tenant.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ConflictingTenants`] when the ends declare two
    /// different concrete tenants.
    pub fn tenant(&self) -> Result<Customer, CompileError> {
        match (&self.connecter.customer, &self.connectee.customer) {
            (left, right) if left == right => Ok(left.clone()),
            (Customer::Provider, other) | (other, Customer::Provider) => Ok(other.clone()),
            (Customer::Tenant(left), Customer::Tenant(right)) => {
                Err(CompileError::ConflictingTenants {
                    connecter: self.connecter.site_id.clone(),
                    connectee: self.connectee.site_id.clone(),
                    connecter_tenant: left.clone(),
                    connectee_tenant: right.clone(),
                })
            }
        }
    }

    /// Returns the virtual host holding the connecter-side objects.
    ///
    /// Same-customer connections use the default vhost; provider-to-tenant
    /// connections use the tenant's dedicated vhost.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ConflictingTenants`] when the tenant cannot be
    /// resolved.
    pub fn connecter_vhost(&self) -> Result<String, CompileError> {
        if self.shares_customer() {
            return Ok(DEFAULT_VHOST_NAME.to_string());
        }
        Ok(self.tenant()?.as_str().to_string())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors that abort a compilation.
///
/// Applying a partially compiled topology risks leaking messages across
/// tenants, so every variant is fatal for the whole input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The two ends of a connection declare different concrete tenants.
    #[error(
        "connection {connecter} -> {connectee} mixes tenants {connecter_tenant} and \
         {connectee_tenant}"
    )]
    ConflictingTenants {
        /// Connecter site.
        connecter: SiteId,
        /// Connectee site.
        connectee: SiteId,
        /// Tenant declared by the connecter.
        connecter_tenant: TenantId,
        /// Tenant declared by the connectee.
        connectee_tenant: TenantId,
    },
    /// A site is connected to itself.
    #[error("connection {site} -> {site} connects a site to itself")]
    SelfConnection {
        /// Offending site.
        site: SiteId,
    },
    /// A site is declared with different customers across connections.
    #[error("site {site} is declared with customers {first} and {second}")]
    InconsistentCustomer {
        /// Offending site.
        site: SiteId,
        /// Customer seen first.
        first: Customer,
        /// Conflicting customer.
        second: Customer,
    },
    /// The same connection is declared twice with different addresses.
    #[error("connection {connecter} -> {connectee} is declared with conflicting addresses")]
    ConflictingAddress {
        /// Connecter site.
        connecter: SiteId,
        /// Connectee site.
        connectee: SiteId,
    },
    /// The connectee address does not form a valid broker URI.
    #[error("connectee {connectee} has an invalid address: {reason}")]
    InvalidAddress {
        /// Connectee site.
        connectee: SiteId,
        /// Parser failure description.
        reason: String,
    },
}

impl CompileError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConflictingTenants {
                ..
            } => "conflicting_tenants",
            Self::SelfConnection {
                ..
            } => "self_connection",
            Self::InconsistentCustomer {
                ..
            } => "inconsistent_customer",
            Self::ConflictingAddress {
                ..
            } => "conflicting_address",
            Self::InvalidAddress {
                ..
            } => "invalid_address",
        }
    }
}
