// crates/intersite-cli/src/lib.rs
// ============================================================================
// Module: Intersite CLI Library
// Description: Shared helpers for the intersite command-line interface.
// Purpose: Provide reusable components (i18n, audit) for the binary and tests.
// Dependencies: intersite-core, serde_json
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities: the message catalog used
//! for every user-facing line and the JSON-lines audit sink used by
//! `intersite compile --audit`. The binary entry point (`src/main.rs`)
//! imports these helpers to keep all output consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// JSON-lines audit sink for compile events.
pub mod audit;
/// Internationalization helpers and message catalog.
pub mod i18n;
