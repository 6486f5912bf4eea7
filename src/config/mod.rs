//! # Configuration Management
//!
//! Environment-driven configuration. Every setting has a default, so an
//! empty environment yields a stdio server talking to a local Vault; only
//! `VAULT_TOKEN` is required, and that is checked by the client factory.
//!
//! ## Environment Variables
//!
//! - `VAULT_MCP_TRANSPORT`: `stdio` (default) or `http`
//! - `VAULT_MCP_BIND_ADDRESS` / `VAULT_MCP_PORT`: HTTP listener (default `127.0.0.1:8080`)
//! - `VAULT_MCP_CACHE_ENABLED`: response cache on/off (default on)
//! - `VAULT_MCP_TOOL_CACHE_TTL_SECS` / `VAULT_MCP_RESOURCE_CACHE_TTL_SECS`: 30 / 60
//! - `VAULT_MCP_LOG_LEVEL` / `VAULT_MCP_LOG_FORMAT`: `info` / `pretty`

pub mod settings;

pub use settings::{AppConfig, CacheConfig, LogFormat, ObservabilityConfig, ServerConfig, TransportKind};
