//! Shared helpers: a wiremock stand-in for Vault and an MCP handler bound to it.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use vault_mcp_server::config::CacheConfig;
use vault_mcp_server::mcp::{JsonRpcId, JsonRpcRequest, McpHandler, SessionLifecycle};
use vault_mcp_server::vault::VaultSettings;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "hvs.CAESIJtest";

/// Settings pointing at the mock server with the test token.
pub fn settings_for(server: &MockServer) -> VaultSettings {
    VaultSettings::with_overrides(Some(server.uri()), Some(TEST_TOKEN.to_string()))
}

/// Mount the token lookup and health answers of a healthy, unsealed Vault.
pub async fn mount_healthy_vault(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", TEST_TOKEN))
        .respond_with(token_lookup())
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/health"))
        .respond_with(health(200, true, false))
        .mount(server)
        .await;
}

/// Response envelope as Vault wraps every `data` payload.
pub fn vault_data(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "request_id": "8f5e1c3a-5d0b-4a8e-9d7c-0f6a2b1e4c90",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": data,
        "wrap_info": null,
        "warnings": null,
        "auth": null
    }))
}

/// `auth/token/lookup-self` for the root test token.
pub fn token_lookup() -> ResponseTemplate {
    vault_data(json!({
        "accessor": "8609694a-cdbc-db9b-d345-e782dbb562ed",
        "creation_time": 1718000000,
        "creation_ttl": 0,
        "display_name": "root",
        "entity_id": "",
        "expire_time": null,
        "explicit_max_ttl": 0,
        "id": TEST_TOKEN,
        "identity_policies": null,
        "issue_time": "2024-06-10T06:13:20Z",
        "meta": null,
        "num_uses": 0,
        "orphan": true,
        "path": "auth/token/root",
        "policies": ["root"],
        "renewable": false,
        "ttl": 0,
        "type": "service"
    }))
}

/// `sys/health` with the status code Vault uses for the given state.
pub fn health(status: u16, initialized: bool, sealed: bool) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "initialized": initialized,
        "sealed": sealed,
        "standby": false,
        "performance_standby": false,
        "replication_performance_mode": "disabled",
        "replication_perf_mode": "disabled",
        "replication_dr_mode": "disabled",
        "server_time_utc": 1718000000,
        "version": "1.17.0",
        "cluster_name": "vault-cluster-test",
        "cluster_id": "3b1f9c2e-7a4d-4e8b-9f0a-1c2d3e4f5a6b"
    }))
}

/// KV v2 version metadata as returned by writes and reads.
pub fn version_metadata(version: u64) -> Value {
    json!({
        "created_time": "2024-06-01T12:00:00.000000Z",
        "custom_metadata": null,
        "deletion_time": "",
        "destroyed": false,
        "version": version
    })
}

/// A Vault error response with the given `errors` array.
pub fn vault_error(status: u16, errors: &[&str]) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "errors": errors }))
}

/// Start a healthy mock Vault.
pub async fn healthy_vault() -> MockServer {
    let server = MockServer::start().await;
    mount_healthy_vault(&server).await;
    server
}

/// Handler with an active session against `server`.
pub async fn handler_for(server: &MockServer) -> McpHandler {
    handler_with_cache(server, &CacheConfig::default()).await
}

pub async fn handler_with_cache(server: &MockServer, cache: &CacheConfig) -> McpHandler {
    let lifecycle = Arc::new(SessionLifecycle::new());
    lifecycle.start(&settings_for(server)).await.expect("session starts");
    McpHandler::new(lifecycle, cache).expect("handler builds")
}

pub fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(JsonRpcId::Number(id)),
        method: method.to_string(),
        params,
    }
}

/// Raw `tools/call` result object.
pub async fn call_tool_raw(handler: &McpHandler, name: &str, arguments: Value) -> Value {
    let response = handler
        .handle_request(request(1, "tools/call", json!({"name": name, "arguments": arguments})))
        .await
        .expect("tools/call responds");
    assert!(response.error.is_none(), "{} failed: {:?}", name, response.error);
    response.result.expect("tools/call result")
}

/// Call a tool and decode its output: structured content when present,
/// otherwise the text parsed as JSON, otherwise the text itself.
pub async fn call_tool(handler: &McpHandler, name: &str, arguments: Value) -> Value {
    let result = call_tool_raw(handler, name, arguments).await;
    assert_ne!(result["isError"], json!(true), "{} reported an error: {}", name, result);

    if let Some(structured) = result.get("structuredContent") {
        return structured.clone();
    }
    let text = result["content"][0]["text"].as_str().expect("text content").to_string();
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
