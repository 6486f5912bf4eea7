//! MCP HTTP Transport
//!
//! Streamable HTTP endpoint: each `POST /mcp` carries one JSON-RPC message
//! and gets its response as a JSON body. Notifications are acknowledged with
//! `202 Accepted` and no body.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::errors::{Error, Result};
use crate::mcp::error::McpError;
use crate::mcp::handler::McpHandler;
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Router serving `POST /mcp` and `GET /health`.
pub fn build_router(handler: Arc<McpHandler>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_http_handler))
        .route("/health", get(health_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(handler)
}

/// POST /mcp
pub async fn mcp_http_handler(State(handler): State<Arc<McpHandler>>, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Failed to parse JSON-RPC request body");
            let error = McpError::ParseError(e.to_string());
            let response = JsonRpcResponse::failure(None, error.into());
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    match handler.handle_request(request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// GET /health
pub async fn health_handler(State(handler): State<Arc<McpHandler>>) -> Response {
    let session_active = handler.lifecycle().is_active().await;
    let status = if session_active { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = json!({
        "status": if session_active { "ok" } else { "unavailable" },
        "vault_session": session_active,
        "version": crate::VERSION,
    });
    (status, Json(body)).into_response()
}

/// Bind the listener and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, handler: Arc<McpHandler>) -> Result<()> {
    let addr: SocketAddr = config
        .socket_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind MCP HTTP server: {}", e)))?;

    info!(address = %addr, "Starting MCP HTTP server");

    axum::serve(listener, build_router(handler))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "MCP HTTP server shutdown listener failed");
            }
        })
        .await
        .map_err(|e| Error::transport(format!("MCP HTTP server error: {}", e)))?;

    info!("MCP HTTP server shutdown completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::mcp::lifecycle::SessionLifecycle;
    use crate::mcp::protocol::error_codes;
    use axum_test::TestServer;
    use serde_json::Value;

    fn test_server() -> TestServer {
        let handler = McpHandler::new(Arc::new(SessionLifecycle::new()), &CacheConfig::default())
            .expect("handler builds");
        TestServer::new(build_router(Arc::new(handler))).expect("test server")
    }

    #[tokio::test]
    async fn test_post_request_returns_response() {
        let server = test_server();
        let response =
            server.post("/mcp").json(&json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"], json!({}));
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let server = test_server();
        let response = server
            .post("/mcp")
            .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;

        response.assert_status(StatusCode::ACCEPTED);
        assert!(response.text().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = test_server();
        let response = server.post("/mcp").text("{oops").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_health_reports_missing_session() {
        let server = test_server();
        let response = server.get("/health").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["vault_session"], false);
    }
}
