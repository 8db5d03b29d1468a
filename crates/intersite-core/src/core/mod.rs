// crates/intersite-core/src/core/mod.rs
// ============================================================================
// Module: Intersite Core Types
// Description: Canonical connection model, options and broker definitions.
// Purpose: Provide stable, serializable types for compiler inputs and outputs.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types describe what goes into the compiler (connections and options)
//! and what comes out (per-site broker definitions and their digests).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod connection;
pub mod definitions;
pub mod hashing;
pub mod identifiers;
pub mod options;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use connection::CompileError;
pub use connection::Connectee;
pub use connection::Connecter;
pub use connection::Connection;
pub use connection::Customer;
pub use connection::DEFAULT_VHOST_NAME;
pub use connection::PROVIDER_LABEL;
pub use definitions::AckMode;
pub use definitions::Binding;
pub use definitions::DeleteAfter;
pub use definitions::Definitions;
pub use definitions::DestinationType;
pub use definitions::Exchange;
pub use definitions::ExchangeType;
pub use definitions::ParameterComponent;
pub use definitions::Permission;
pub use definitions::Queue;
pub use definitions::Shovel;
pub use definitions::ShovelValue;
pub use definitions::User;
pub use definitions::VirtualHost;
pub use hashing::DIGEST_ALGORITHM;
pub use hashing::DefinitionsDigest;
pub use hashing::HashError;
pub use identifiers::SiteId;
pub use identifiers::TenantId;
pub use options::CompileOptions;
pub use options::QueueArguments;
pub use options::TlsReferences;
