// crates/intersite-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for intersite-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use intersite_config::ConfigError;
use intersite_config::IntersiteConfig;

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// Single valid connection between a provider hub and a tenant remote.
pub const HUB_CONNECTION: &str = r#"
[[connections]]
[connections.connecter]
site_id = "central"
[connections.connectee]
site_id = "remote1"
customer = "acme"
hostname = "remote1.example.com"
port = 5671
"#;

/// Parses a TOML string into an `IntersiteConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<IntersiteConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a config holding only [`HUB_CONNECTION`].
pub fn hub_config() -> Result<IntersiteConfig, toml::de::Error> {
    config_from_toml(HUB_CONNECTION)
}

/// Assert that a validation result is an error containing a specific substring.
pub fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}
