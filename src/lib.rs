//! # vault-mcp-server
//!
//! A Model Context Protocol server that exposes a HashiCorp Vault instance to
//! AI agents. Vault operations (KV v2, PKI, database, transit, policies,
//! mounts, audit devices and auth methods) are published as MCP tools, with a
//! handful of read-only resources and ACL-policy prompts alongside.
//!
//! ## Architecture
//!
//! ```text
//! stdio / HTTP transport → McpHandler → ToolRegistry → SessionContext → Vault HTTP API
//!                              ↓
//!                        ResponseCache
//! ```
//!
//! - [`vault`]: authenticated raw HTTP client and per-domain operation handles
//! - [`mcp`]: protocol types, registries, request handler and transports
//! - [`config`]: environment-driven configuration
//! - [`observability`]: structured logging

pub mod cli;
pub mod config;
pub mod errors;
pub mod mcp;
pub mod observability;
pub mod vault;

pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
