//! # Structured Logging
//!
//! `tracing-subscriber` setup. Output always goes to stderr: with the stdio
//! transport, stdout carries the protocol stream and must stay clean.

use crate::config::{AppConfig, LogFormat, ObservabilityConfig};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed (for example by a
/// test harness); the existing one is kept.
pub fn init_logging(config: &ObservabilityConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match config.log_format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    installed.is_ok()
}

/// Create a tracing span for one JSON-RPC request.
#[macro_export]
macro_rules! rpc_span {
    ($method:expr) => {
        tracing::info_span!(
            "mcp_request",
            method = %$method,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($method:expr, $($field:tt)*) => {
        tracing::info_span!(
            "mcp_request",
            method = %$method,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Log configuration at startup. The Vault token is never logged.
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        transport = %config.server.transport,
        http_address = %config.server.socket_address(),
        vault_url = %config.vault.resolve_url(),
        cache_enabled = %config.cache.enabled,
        tool_cache_ttl_secs = config.cache.tool_ttl_seconds,
        resource_cache_ttl_secs = config.cache.resource_ttl_seconds,
        "Vault MCP server configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = rpc_span!("tools/call");
        let _span = rpc_span!("tools/call", tool = "kv2-read");
    }

    #[test]
    fn test_env_filter_uses_configured_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = ObservabilityConfig { log_level: "debug".to_string(), ..Default::default() };
        assert_eq!(env_filter(&config).to_string(), "debug");
    }

    #[test]
    fn test_log_config_info() {
        log_config_info(&AppConfig::default());
    }
}
