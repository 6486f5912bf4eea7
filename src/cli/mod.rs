//! # Command Line Interface
//!
//! `vault-mcp-server serve` starts the MCP server on the configured transport;
//! `vault-mcp-server tools` prints the tool catalogue. Flags override the
//! `VAULT_*` / `VAULT_MCP_*` environment. Running without a subcommand serves
//! over stdio, which is how MCP clients usually launch the binary.

use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, LogFormat, TransportKind};
use crate::mcp::{http, McpHandler, McpStdioServer, SessionLifecycle, ToolRegistry, ToolsListResult};
use crate::observability::{init_logging, log_config_info};

#[derive(Parser, Debug)]
#[command(name = "vault-mcp-server")]
#[command(about = "Model Context Protocol server for HashiCorp Vault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server
    Serve(ServeArgs),

    /// Print the tool catalogue as JSON
    Tools {
        /// Only include tools with this tag (e.g. `pki`, `transit`)
        #[arg(long)]
        tag: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Transport to serve on
    #[arg(long, value_enum)]
    pub transport: Option<TransportKind>,

    /// HTTP bind address
    #[arg(long)]
    pub bind_address: Option<String>,

    /// HTTP port
    #[arg(long)]
    pub port: Option<u16>,

    /// Vault server address (overrides VAULT_URL)
    #[arg(long)]
    pub vault_url: Option<String>,

    /// Vault token (overrides VAULT_TOKEN)
    #[arg(long)]
    pub vault_token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl ServeArgs {
    /// Layer command-line flags over the environment configuration.
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(transport) = self.transport {
            config.server.transport = transport;
        }
        if let Some(bind_address) = self.bind_address {
            config.server.bind_address = bind_address;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.vault_url.is_some() {
            config.vault.url = self.vault_url;
        }
        if self.vault_token.is_some() {
            config.vault.token = self.vault_token;
        }
        if self.verbose {
            config.observability.log_level = "debug".to_string();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Tools { tag } => handle_tools(tag.as_deref()),
    }
}

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    args.apply(&mut config);
    config.validate()?;

    init_logging(&config.observability);
    info!(app_name = crate::APP_NAME, version = crate::VERSION, "Starting Vault MCP server");
    log_config_info(&config);

    let lifecycle = Arc::new(SessionLifecycle::new());
    lifecycle.start(&config.vault).await?;

    let handler = Arc::new(McpHandler::new(Arc::clone(&lifecycle), &config.cache)?);

    let served = match config.server.transport {
        TransportKind::Stdio => McpStdioServer::new(handler).run().await,
        TransportKind::Http => http::serve(&config.server, handler).await.map_err(Into::into),
    };

    lifecycle.shutdown().await;
    served
}

fn handle_tools(tag: Option<&str>) -> anyhow::Result<()> {
    let registry = ToolRegistry::with_all_tools()?;
    let tools = registry
        .iter()
        .filter(|descriptor| tag.is_none_or(|tag| descriptor.tag == tag))
        .map(|descriptor| descriptor.to_tool())
        .collect();

    let catalogue = ToolsListResult { tools, next_cursor: None };
    println!("{}", serde_json::to_string_pretty(&catalogue)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["vault-mcp-server"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_flags_override_config() {
        let cli = Cli::try_parse_from([
            "vault-mcp-server",
            "serve",
            "--transport",
            "http",
            "--port",
            "9000",
            "--vault-url",
            "https://vault.example.com",
            "--vault-token",
            "hvs.abc",
            "--log-format",
            "json",
            "-v",
        ])
        .expect("parses");

        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.server.transport, TransportKind::Http);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.vault.url.as_deref(), Some("https://vault.example.com"));
        assert_eq!(config.vault.token.as_deref(), Some("hvs.abc"));
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_tools_tag_filter() {
        let cli = Cli::try_parse_from(["vault-mcp-server", "tools", "--tag", "transit"]).expect("parses");
        assert!(matches!(cli.command, Some(Commands::Tools { tag: Some(ref t) }) if t == "transit"));
    }

    #[test]
    fn test_rejects_unknown_transport() {
        assert!(Cli::try_parse_from(["vault-mcp-server", "serve", "--transport", "sse"]).is_err());
    }
}
