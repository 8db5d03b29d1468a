// crates/intersite-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog integrity.
// Purpose: Keep catalog keys unique and placeholders well formed.
// Dependencies: intersite-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies the CLI message catalog has one entry per key and that every
//! template uses `{lower_snake}` placeholders only.

use std::collections::BTreeSet;

use crate::i18n::CATALOG_ITEMS;
use crate::i18n::MessageArg;
use crate::i18n::translate;

fn parse_placeholder_names(template: &str) -> Result<BTreeSet<String>, String> {
    let mut placeholders = BTreeSet::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if rest[.. open].contains('}') {
            return Err(format!("unmatched '}}' in '{template}'"));
        }
        let after = &rest[open + 1 ..];
        let Some(close) = after.find('}') else {
            return Err(format!("unclosed '{{' in '{template}'"));
        };
        let name = &after[.. close];
        if name.is_empty() || name.contains('{') {
            return Err(format!("malformed placeholder in '{template}'"));
        }
        if !name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
            return Err(format!("placeholder '{name}' must use [a-z0-9_]"));
        }
        placeholders.insert(name.to_string());
        rest = &after[close + 1 ..];
    }
    if rest.contains('}') {
        return Err(format!("unmatched '}}' in '{template}'"));
    }
    Ok(placeholders)
}

#[test]
fn catalog_has_unique_keys() {
    let mut seen = BTreeSet::new();
    for (key, _) in CATALOG_ITEMS {
        assert!(seen.insert(*key), "duplicate catalog key '{key}'");
    }
}

#[test]
fn catalog_templates_have_valid_placeholder_syntax() {
    for (key, template) in CATALOG_ITEMS {
        parse_placeholder_names(template)
            .unwrap_or_else(|error| panic!("invalid placeholder syntax for key '{key}': {error}"));
    }
}

#[test]
fn compile_messages_name_their_inputs() {
    let template = translate("compile.write_failed", Vec::new());
    let placeholders = parse_placeholder_names(&template).unwrap();
    assert_eq!(placeholders, BTreeSet::from(["error".to_string(), "path".to_string()]));
}

#[test]
fn unused_argument_is_ignored() {
    let rendered = translate("paths.none", vec![MessageArg::new("tenant", "acme")]);
    assert_eq!(rendered, "  (no reachable pairs)");
}
