// crates/intersite-config/src/lib.rs
// ============================================================================
// Module: Intersite Config Library
// Description: Canonical config model and validation for intersite.toml.
// Purpose: Single source of truth for topology file semantics.
// Dependencies: intersite-core, serde, toml
// ============================================================================

//! ## Overview
//! `intersite-config` loads the declared site connections and naming policy
//! from `intersite.toml`. Loading is strict and fails closed: unknown fields,
//! oversized files and malformed identifiers are rejected before the compiler
//! ever sees them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
