//! # Configuration Settings
//!
//! Settings for the transports, the response cache and logging. Vault
//! connection settings live in [`VaultSettings`] and are resolved by the
//! client factory itself.

use crate::errors::{Error, Result};
use crate::vault::client::{VaultSettings, VAULT_TIMEOUT_ENV};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

pub const TRANSPORT_ENV: &str = "VAULT_MCP_TRANSPORT";
pub const BIND_ADDRESS_ENV: &str = "VAULT_MCP_BIND_ADDRESS";
pub const PORT_ENV: &str = "VAULT_MCP_PORT";
pub const CACHE_ENABLED_ENV: &str = "VAULT_MCP_CACHE_ENABLED";
pub const TOOL_CACHE_TTL_ENV: &str = "VAULT_MCP_TOOL_CACHE_TTL_SECS";
pub const RESOURCE_CACHE_TTL_ENV: &str = "VAULT_MCP_RESOURCE_CACHE_TTL_SECS";
pub const LOG_LEVEL_ENV: &str = "VAULT_MCP_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "VAULT_MCP_LOG_FORMAT";

/// Main application configuration
#[derive(Debug, Clone, Default, Validate)]
pub struct AppConfig {
    /// Vault connection settings; unset fields fall back to `VAULT_*`
    pub vault: VaultSettings,

    #[validate(nested)]
    pub server: ServerConfig,

    #[validate(nested)]
    pub cache: CacheConfig,

    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load every section from the environment and validate the result.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            vault: VaultSettings { timeout: vault_timeout_from_env()?, ..Default::default() },
            server: ServerConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            observability: ObservabilityConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)
    }
}

/// Which transport serves the protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Line-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// `POST /mcp` over HTTP
    Http,
}

impl FromStr for TransportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" | "streamable-http" => Ok(Self::Http),
            other => Err(Error::config(format!(
                "Invalid transport '{}': expected 'stdio' or 'http'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    pub transport: TransportKind,

    /// HTTP bind address
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind_address: String,

    /// HTTP port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { transport: TransportKind::Stdio, bind_address: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ServerConfig {
    /// Socket address the HTTP transport listens on
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let transport = match std::env::var(TRANSPORT_ENV) {
            Ok(value) => value.parse()?,
            Err(_) => defaults.transport,
        };
        let bind_address = std::env::var(BIND_ADDRESS_ENV).unwrap_or(defaults.bind_address);
        let port = parse_env(PORT_ENV)?.unwrap_or(defaults.port);

        Ok(Self { transport, bind_address, port })
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    pub enabled: bool,

    /// TTL for read-only tool results
    #[validate(range(min = 1, max = 3600, message = "Tool cache TTL must be between 1 and 3600 seconds"))]
    pub tool_ttl_seconds: u64,

    /// TTL for resource reads
    #[validate(range(min = 1, max = 3600, message = "Resource cache TTL must be between 1 and 3600 seconds"))]
    pub resource_ttl_seconds: u64,

    /// Maximum number of cached entries
    #[validate(range(min = 1, message = "Cache must hold at least one entry"))]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, tool_ttl_seconds: 30, resource_ttl_seconds: 60, max_entries: 1000 }
    }
}

impl CacheConfig {
    pub fn tool_ttl(&self) -> Duration {
        Duration::from_secs(self.tool_ttl_seconds)
    }

    pub fn resource_ttl(&self) -> Duration {
        Duration::from_secs(self.resource_ttl_seconds)
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let enabled = std::env::var(CACHE_ENABLED_ENV)
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.enabled);
        let tool_ttl_seconds = parse_env(TOOL_CACHE_TTL_ENV)?.unwrap_or(defaults.tool_ttl_seconds);
        let resource_ttl_seconds =
            parse_env(RESOURCE_CACHE_TTL_ENV)?.unwrap_or(defaults.resource_ttl_seconds);

        Ok(Self { enabled, tool_ttl_seconds, resource_ttl_seconds, max_entries: defaults.max_entries })
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(Error::config(format!(
                "Invalid log format '{}': expected 'pretty' or 'json'",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), log_format: LogFormat::Pretty }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let log_level = std::env::var(LOG_LEVEL_ENV).unwrap_or(defaults.log_level);
        let log_format = match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) => value.parse()?,
            Err(_) => defaults.log_format,
        };

        Ok(Self { log_level, log_format })
    }
}

/// Parse an optional numeric environment variable; malformed values are errors.
fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

fn vault_timeout_from_env() -> Result<Option<Duration>> {
    Ok(parse_env::<u64>(VAULT_TIMEOUT_ENV)?.map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.transport, TransportKind::Stdio);
        assert_eq!(config.server.socket_address(), "127.0.0.1:8080");
        assert_eq!(config.cache.tool_ttl(), Duration::from_secs(30));
        assert_eq!(config.cache.resource_ttl(), Duration::from_secs(60));
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transport_parsing() {
        assert_eq!("HTTP".parse::<TransportKind>().expect("http"), TransportKind::Http);
        assert_eq!("stdio".parse::<TransportKind>().expect("stdio"), TransportKind::Stdio);
        assert!("sse".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().expect("json"), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_ttl() {
        let mut config = AppConfig::default();
        config.cache.tool_ttl_seconds = 0;
        let err = config.validate().expect_err("zero ttl");
        assert!(matches!(err, Error::Validation(msg) if msg.contains("Tool cache TTL")));
    }

    // Environment manipulation stays in one test to avoid races between tests.
    #[test]
    fn test_config_from_env() {
        env::set_var(TRANSPORT_ENV, "http");
        env::set_var(PORT_ENV, "9191");
        env::set_var(CACHE_ENABLED_ENV, "false");
        env::set_var(LOG_FORMAT_ENV, "json");

        let config = AppConfig::from_env().expect("valid env");
        assert_eq!(config.server.transport, TransportKind::Http);
        assert_eq!(config.server.port, 9191);
        assert!(!config.cache.enabled);
        assert_eq!(config.observability.log_format, LogFormat::Json);

        env::set_var(PORT_ENV, "not-a-port");
        assert!(matches!(AppConfig::from_env(), Err(Error::Config(msg)) if msg.contains(PORT_ENV)));

        for name in [TRANSPORT_ENV, PORT_ENV, CACHE_ENABLED_ENV, LOG_FORMAT_ENV] {
            env::remove_var(name);
        }

        let config = AppConfig::from_env().expect("defaults");
        assert_eq!(config.server.port, 8080);
        assert!(config.cache.enabled);
    }
}
