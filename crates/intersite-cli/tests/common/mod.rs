// crates/intersite-cli/tests/common/mod.rs
// ============================================================================
// Module: CLI Test Helpers
// Description: Shared helpers for driving the intersite binary.
// Purpose: Reduce duplication across CLI integration tests.
// Dependencies: intersite-cli binary, tempfile
// ============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

/// Provider hub linked to two same-tenant remotes, which are linked together.
pub const TENANT_TRIANGLE: &str = r#"
[[connections]]
[connections.connecter]
site_id = "central"
[connections.connectee]
site_id = "remote1"
customer = "acme"
hostname = "remote1.example.com"
port = 5671

[[connections]]
[connections.connecter]
site_id = "central"
[connections.connectee]
site_id = "remote2"
customer = "acme"
hostname = "remote2.example.com"
port = 5671

[[connections]]
[connections.connecter]
site_id = "remote1"
customer = "acme"
[connections.connectee]
site_id = "remote2"
customer = "acme"
hostname = "remote2.example.com"
port = 5671
"#;

/// Three provider sites connected in a line.
pub const PROVIDER_CHAIN: &str = r#"
[[connections]]
[connections.connecter]
site_id = "site1"
[connections.connectee]
site_id = "site2"
hostname = "site2.example.com"
port = 5671

[[connections]]
[connections.connecter]
site_id = "site2"
[connections.connectee]
site_id = "site3"
hostname = "site3.example.com"
port = 5671
"#;

/// Connection mixing two concrete tenants.
pub const MIXED_TENANTS: &str = r#"
[[connections]]
[connections.connecter]
site_id = "a"
customer = "beta"
[connections.connectee]
site_id = "b"
customer = "gamma"
hostname = "b.example.com"
port = 5671
"#;

/// Returns the path of the compiled binary.
pub fn intersite_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_intersite"))
}

/// Writes `contents` as `intersite.toml` in a fresh temp dir.
pub fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("intersite.toml");
    fs::write(&path, contents.trim()).expect("write config");
    (dir, path)
}

/// Runs the binary with `args`, ignoring any config env override.
pub fn run(args: &[&str]) -> Output {
    Command::new(intersite_bin())
        .args(args)
        .env_remove("INTERSITE_CONFIG")
        .output()
        .expect("run intersite")
}

/// Runs the binary with `--config <path>` appended.
pub fn run_with_config(args: &[&str], config: &Path) -> Output {
    let config = config.to_string_lossy();
    let mut full: Vec<&str> = args.to_vec();
    full.extend(["--config", config.as_ref()]);
    run(&full)
}

/// Returns stdout as UTF-8.
pub fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

/// Returns stderr as UTF-8.
pub fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("utf-8 stderr")
}
