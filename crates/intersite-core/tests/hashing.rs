// crates/intersite-core/tests/hashing.rs
// ============================================================================
// Module: Hashing Tests
// Description: Tests for canonical JSON digests of definitions bundles.
// ============================================================================
//! ## Overview
//! Validates RFC 8785 canonical encoding and per-site bundle digests.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::connection;
use intersite_core::CompileOptions;
use intersite_core::Definitions;
use intersite_core::DefinitionsDigest;
use intersite_core::TopologyCompiler;
use intersite_core::hashing::canonical_json_bytes;
use intersite_core::hashing::definitions_digest;
use serde_json::json;

// ============================================================================
// SECTION: Canonical Encoding
// ============================================================================

/// Tests canonical bytes sort keys.
#[test]
fn test_canonical_bytes_sort_keys() {
    let bytes = canonical_json_bytes(&json!({"z": true, "a": [2, 1]})).unwrap();
    assert_eq!(bytes, br#"{"a":[2,1],"z":true}"#);
}

/// Tests canonical bytes ignore key insertion order.
#[test]
fn test_canonical_bytes_are_stable() {
    let value_a = canonical_json_bytes(&json!({"b": 1, "a": 2})).unwrap();
    let value_b = canonical_json_bytes(&json!({"a": 2, "b": 1})).unwrap();
    assert_eq!(value_a, value_b);
}

// ============================================================================
// SECTION: Digests
// ============================================================================

/// Tests the known sha256 digest of empty input.
#[test]
fn test_digest_known_vector() {
    let digest = DefinitionsDigest::of_canonical_bytes(b"");
    assert_eq!(
        digest.as_str(),
        "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(digest.hex().len(), 64);
    assert_eq!(digest.to_string(), digest.as_str());
}

/// Tests the digest of a bundle matches the digest of its canonical bytes.
#[test]
fn test_definitions_digest_uses_canonical_bytes() {
    let definitions = Definitions::new();
    let bytes = canonical_json_bytes(&definitions).unwrap();
    assert_eq!(
        definitions_digest(&definitions).unwrap(),
        DefinitionsDigest::of_canonical_bytes(&bytes)
    );
}

/// Tests that bundle digests follow content, not declaration order.
#[test]
fn test_bundle_digests_follow_content() {
    let compiler = TopologyCompiler::new(CompileOptions::default());
    let forward = compiler
        .compile(&[connection("a", "acme", "b", "acme"), connection("b", "acme", "c", "acme")])
        .unwrap();
    let backward = compiler
        .compile(&[connection("b", "acme", "c", "acme"), connection("a", "acme", "b", "acme")])
        .unwrap();
    assert_eq!(forward.digests().unwrap(), backward.digests().unwrap());

    let digests = forward.digests().unwrap();
    let a = &digests[&common::site("a")];
    let c = &digests[&common::site("c")];
    assert_ne!(a, c);
}
