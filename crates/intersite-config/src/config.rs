// crates/intersite-config/src/config.rs
// ============================================================================
// Module: Intersite Configuration
// Description: Configuration loading and validation for intersite topologies.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: intersite-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Identifiers end up in broker object names, routing keys and URIs, so they
//! are restricted to a conservative character set here rather than escaped
//! later. Tenant compatibility between connection ends is left to the
//! compiler, which reports it with the offending sites.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use intersite_core::CompileOptions;
use intersite_core::Connection;
use intersite_core::Customer;
use intersite_core::QueueArguments;
use intersite_core::SiteId;
use intersite_core::TlsReferences;
use intersite_core::core::options::DEFAULT_EXCHANGE;
use intersite_core::core::options::DEFAULT_MAX_LENGTH_BYTES;
use intersite_core::core::options::DEFAULT_MESSAGE_TTL_MS;
use intersite_core::core::options::DEFAULT_QUEUE_PREFIX;
use intersite_core::core::options::DEFAULT_SHOVEL_PREFIX;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "intersite.toml";
/// Environment variable overriding the config path.
pub const CONFIG_ENV_VAR: &str = "INTERSITE_CONFIG";
/// Maximum config file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a site or tenant identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 64;
/// Maximum length of a DNS hostname.
pub const MAX_HOSTNAME_LENGTH: usize = 253;
/// Maximum length of an exchange, queue or relay name prefix.
pub const MAX_NAME_LENGTH: usize = 255;
/// Maximum number of declared connections.
pub const MAX_CONNECTIONS: usize = 4096;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Intersite topology configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntersiteConfig {
    /// Broker object naming.
    #[serde(default)]
    pub naming: NamingConfig,
    /// Intersite queue arguments.
    #[serde(default)]
    pub queues: QueueConfig,
    /// Optional certificate references for outbound relays.
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    /// Declared site connections.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl IntersiteConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.naming.validate()?;
        self.queues.validate()?;
        if let Some(tls) = &self.tls {
            tls.validate()?;
        }
        if self.connections.len() > MAX_CONNECTIONS {
            return Err(ConfigError::Invalid(format!(
                "connections exceeds max of {MAX_CONNECTIONS}"
            )));
        }
        for (index, connection) in self.connections.iter().enumerate() {
            validate_connection(index, connection)?;
        }
        Ok(())
    }

    /// Returns the compile options described by this configuration.
    #[must_use]
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            exchange: self.naming.exchange.clone(),
            queue_prefix: self.naming.queue_prefix.clone(),
            shovel_prefix: self.naming.shovel_prefix.clone(),
            queue_arguments: QueueArguments {
                message_ttl_ms: self.queues.message_ttl_ms,
                max_length_bytes: self.queues.max_length_bytes,
            },
            tls: self.tls.as_ref().map(TlsConfig::references).unwrap_or_default(),
        }
    }
}

/// Broker object naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingConfig {
    /// Shared topic exchange name.
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// Intersite queue namespace.
    #[serde(default = "default_queue_prefix")]
    pub queue_prefix: String,
    /// Relay name prefix.
    #[serde(default = "default_shovel_prefix")]
    pub shovel_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            exchange: default_exchange(),
            queue_prefix: default_queue_prefix(),
            shovel_prefix: default_shovel_prefix(),
        }
    }
}

impl NamingConfig {
    /// Validates naming values.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_name("naming.exchange", &self.exchange)?;
        validate_name("naming.queue_prefix", &self.queue_prefix)?;
        validate_name("naming.shovel_prefix", &self.shovel_prefix)
    }
}

/// Intersite queue arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Per-message time-to-live in milliseconds.
    #[serde(default = "default_message_ttl_ms")]
    pub message_ttl_ms: u64,
    /// Maximum total queue size in bytes.
    #[serde(default = "default_max_length_bytes")]
    pub max_length_bytes: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            message_ttl_ms: default_message_ttl_ms(),
            max_length_bytes: default_max_length_bytes(),
        }
    }
}

impl QueueConfig {
    /// Validates queue arguments.
    fn validate(self) -> Result<(), ConfigError> {
        if self.message_ttl_ms == 0 {
            return Err(ConfigError::Invalid("queues.message_ttl_ms must be > 0".to_string()));
        }
        if self.max_length_bytes == 0 {
            return Err(ConfigError::Invalid("queues.max_length_bytes must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Certificate file references for outbound relays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsConfig {
    /// CA bundle used to verify remote brokers.
    #[serde(default)]
    pub cacertfile: Option<String>,
    /// Client certificate presented to remote brokers.
    #[serde(default)]
    pub certfile: Option<String>,
    /// Client private key file.
    #[serde(default)]
    pub keyfile: Option<String>,
}

impl TlsConfig {
    /// Validates the configured paths.
    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("tls.cacertfile", &self.cacertfile),
            ("tls.certfile", &self.certfile),
            ("tls.keyfile", &self.keyfile),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                validate_path_string(field, value)?;
            }
        }
        Ok(())
    }

    /// Returns the references carried into relay URIs.
    fn references(&self) -> TlsReferences {
        TlsReferences {
            cacertfile: self.cacertfile.as_ref().map(|path| path.trim().to_string()),
            certfile: self.certfile.as_ref().map(|path| path.trim().to_string()),
            keyfile: self.keyfile.as_ref().map(|path| path.trim().to_string()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an exchange, queue or relay name prefix.
fn validate_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if value.chars().any(|ch| ch.is_whitespace() || ch == '#' || ch == '*') {
        return Err(ConfigError::Invalid(format!(
            "{field} must not contain whitespace or routing wildcards"
        )));
    }
    Ok(())
}

/// Validates a site or tenant identifier.
fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} exceeds max length of {MAX_IDENTIFIER_LENGTH}"
        )));
    }
    if !value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
        return Err(ConfigError::Invalid(format!(
            "{field} must only contain ASCII letters, digits, '_' or '-'"
        )));
    }
    Ok(())
}

/// Validates one end's site and customer.
fn validate_end(field: &str, site: &SiteId, customer: &Customer) -> Result<(), ConfigError> {
    validate_identifier(&format!("{field}.site_id"), site.as_str())?;
    if let Customer::Tenant(tenant) = customer {
        validate_identifier(&format!("{field}.customer"), tenant.as_str())?;
    }
    Ok(())
}

/// Validates one declared connection.
fn validate_connection(index: usize, connection: &Connection) -> Result<(), ConfigError> {
    let prefix = format!("connections[{index}]");
    let connecter = &connection.connecter;
    let connectee = &connection.connectee;
    validate_end(&format!("{prefix}.connecter"), &connecter.site_id, &connecter.customer)?;
    validate_end(&format!("{prefix}.connectee"), &connectee.site_id, &connectee.customer)?;

    let hostname = connectee.hostname.as_str();
    if hostname.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{prefix}.connectee.hostname must be non-empty"
        )));
    }
    if hostname.len() > MAX_HOSTNAME_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{prefix}.connectee.hostname exceeds max length of {MAX_HOSTNAME_LENGTH}"
        )));
    }
    if hostname.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        return Err(ConfigError::Invalid(format!(
            "{prefix}.connectee.hostname must not contain whitespace"
        )));
    }
    if connectee.port == 0 {
        return Err(ConfigError::Invalid(format!("{prefix}.connectee.port must be > 0")));
    }
    Ok(())
}

/// Default exchange name.
fn default_exchange() -> String {
    DEFAULT_EXCHANGE.to_string()
}

/// Default queue prefix.
fn default_queue_prefix() -> String {
    DEFAULT_QUEUE_PREFIX.to_string()
}

/// Default relay prefix.
fn default_shovel_prefix() -> String {
    DEFAULT_SHOVEL_PREFIX.to_string()
}

/// Default per-message TTL.
const fn default_message_ttl_ms() -> u64 {
    DEFAULT_MESSAGE_TTL_MS
}

/// Default queue byte cap.
const fn default_max_length_bytes() -> u64 {
    DEFAULT_MAX_LENGTH_BYTES
}

// ============================================================================
// SECTION: Tests
// ============================================================================
