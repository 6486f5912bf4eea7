//! MCP Stdio Server
//!
//! Implements the stdio transport for MCP: reads line-delimited JSON-RPC
//! messages from stdin and writes responses to stdout, one per line.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::mcp::error::McpError;
use crate::mcp::handler::McpHandler;
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};

pub struct McpStdioServer {
    handler: Arc<McpHandler>,
}

impl McpStdioServer {
    pub fn new(handler: Arc<McpHandler>) -> Self {
        Self { handler }
    }

    /// Run the stdio server until stdin reaches EOF.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Starting MCP stdio server");

        let mut stdout = tokio::io::stdout();
        self.serve(tokio::io::stdin(), &mut stdout).await?;

        info!("MCP stdio server shutting down (EOF received)");
        Ok(())
    }

    /// Process requests sequentially from `reader`, writing responses to `writer`.
    pub async fn serve<R, W>(&self, reader: R, writer: &mut W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!(error = %e, "Input line is not valid UTF-8");
                    let error = McpError::ParseError(e.to_string());
                    write_response(writer, &JsonRpcResponse::failure(None, error.into())).await?;
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            debug!(bytes = line.len(), "Received input line");

            let request: JsonRpcRequest = match serde_json::from_str(line) {
                Ok(req) => req,
                Err(e) => {
                    warn!(error = %e, "Failed to parse JSON-RPC request");
                    let error = McpError::ParseError(e.to_string());
                    write_response(writer, &JsonRpcResponse::failure(None, error.into())).await?;
                    continue;
                }
            };

            if let Some(response) = self.handler.handle_request(request).await {
                write_response(writer, &response).await?;
            }
        }

        Ok(())
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> anyhow::Result<()> {
    let json = serde_json::to_string(response)?;

    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    Ok(())
}
