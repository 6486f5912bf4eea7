//! MCP Request Handler
//!
//! Routes incoming JSON-RPC requests to the tool, resource and prompt
//! registries. The handler is shared by both transports and only ever reads
//! the session; the response cache is the one piece of mutable state.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn, Instrument};

use crate::config::CacheConfig;
use crate::mcp::cache::ResponseCache;
use crate::mcp::error::McpError;
use crate::mcp::lifecycle::SessionLifecycle;
use crate::mcp::prompts;
use crate::mcp::protocol::*;
use crate::mcp::registry::{RegistryError, ToolRegistry};
use crate::mcp::resources::ResourceRegistry;
use crate::rpc_span;

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "Vault";

/// Guidance returned to the agent from `initialize`.
pub const SERVER_INSTRUCTIONS: &str = "This server exposes a HashiCorp Vault instance. \
Use the tools to manage secrets engines (KV v2, PKI, database, transit) and system \
backends (audit devices, authentication methods, ACL policies, mounts). Read-only tools \
never change Vault state. Tools that create, update or delete report {\"success\": bool} \
when Vault returns no payload. Resources give quick overviews of audit devices, auth \
engines, policies and secret engines; prompts help draft ACL policies.";

/// Echo the client's protocol version when supported, otherwise offer the latest.
pub fn negotiate_version(client_version: &str) -> &'static str {
    SUPPORTED_VERSIONS
        .iter()
        .find(|&&supported| supported == client_version)
        .copied()
        .unwrap_or(PROTOCOL_VERSION)
}

pub struct McpHandler {
    tools: ToolRegistry,
    resources: ResourceRegistry,
    cache: Option<ResponseCache>,
    lifecycle: Arc<SessionLifecycle>,
}

impl McpHandler {
    /// Build the registries and bind them to a session lifecycle.
    pub fn new(lifecycle: Arc<SessionLifecycle>, cache: &CacheConfig) -> Result<Self, RegistryError> {
        let tools = ToolRegistry::with_all_tools()?;
        let resources = ResourceRegistry::with_all_resources()?;
        let cache = cache.enabled.then(|| ResponseCache::new(cache));

        debug!(
            tools = tools.len(),
            resources = resources.len(),
            cache_enabled = cache.is_some(),
            "MCP handler ready"
        );

        Ok(Self { tools, resources, cache, lifecycle })
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn lifecycle(&self) -> &Arc<SessionLifecycle> {
        &self.lifecycle
    }

    /// Handle one JSON-RPC message. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let span = rpc_span!(request.method);
        self.dispatch(request).instrument(span).await
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest { jsonrpc, id, method, params } = request;

        if id.is_none() && method.starts_with("notifications/") {
            debug!(method = %method, "Received notification");
            return None;
        }

        if jsonrpc != "2.0" {
            return Some(self.error_response(
                id,
                McpError::InvalidRequest(format!("Unsupported jsonrpc version '{}'", jsonrpc)),
            ));
        }

        debug!(id = ?id, "Handling MCP request");

        let result = match method.as_str() {
            "initialize" => self.handle_initialize(params),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(params).await,
            "resources/list" => self.handle_resources_list(),
            "resources/read" => self.handle_resources_read(params).await,
            "prompts/list" => self.handle_prompts_list(),
            "prompts/get" => self.handle_prompts_get(params),
            notification if notification.starts_with("notifications/") => Ok(json!({})),
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        let response = match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => self.error_response(id, e),
        };

        debug!(has_error = response.error.is_some(), "Completed MCP request");
        Some(response)
    }

    fn handle_initialize(&self, params: Value) -> Result<Value, McpError> {
        let params: InitializeRequest = parse_params("initialize", params)?;
        let protocol_version = negotiate_version(&params.protocol_version);

        debug!(
            client_name = %params.client_info.name,
            client_version = %params.protocol_version,
            negotiated_version = %protocol_version,
            "Protocol version negotiated"
        );

        let result = InitializeResponse {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability { list_changed: false }),
                resources: Some(ResourceCapabilities { subscribe: false, list_changed: false }),
                prompts: Some(ListChangedCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: crate::VERSION.to_string(),
                title: None,
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        };

        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let result = ToolsListResult { tools: self.tools.tools(), next_cursor: None };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        let call: ToolCallRequest = parse_params("tools/call", params)?;
        let descriptor =
            self.tools.get(&call.name).ok_or_else(|| McpError::ToolNotFound(call.name.clone()))?;
        let context = self.lifecycle.context().await?;
        let args = call.arguments.unwrap_or_else(|| json!({}));
        let read_only = descriptor.side_effect.is_read_only();

        if read_only {
            if let Some(cached) = self.cache.as_ref().and_then(|c| c.get_tool(descriptor.name, &args)) {
                debug!(tool = %descriptor.name, "Serving tool result from cache");
                return Ok(serde_json::to_value(ToolCallResult::from_value(cached)?)?);
            }
        }

        let result = match descriptor.execute(&context, args.clone()).await {
            Ok(value) => {
                if let Some(cache) = &self.cache {
                    if read_only {
                        cache.put_tool(descriptor.name, &args, value.clone());
                    } else {
                        cache.clear();
                    }
                }
                ToolCallResult::from_value(value)?
            }
            Err(McpError::Vault(err)) => {
                warn!(tool = %descriptor.name, error = %err, "Tool execution failed");
                ToolCallResult::error(err.to_string())
            }
            Err(other) => return Err(other),
        };

        Ok(serde_json::to_value(result)?)
    }

    fn handle_resources_list(&self) -> Result<Value, McpError> {
        Ok(serde_json::to_value(self.resources.list())?)
    }

    async fn handle_resources_read(&self, params: Value) -> Result<Value, McpError> {
        let params: ResourceReadParams = parse_params("resources/read", params)?;
        if self.resources.get(&params.uri).is_none() {
            return Err(McpError::ResourceNotFound(params.uri));
        }
        let context = self.lifecycle.context().await?;

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get_resource(&params.uri)) {
            debug!(uri = %params.uri, "Serving resource from cache");
            return Ok(cached);
        }

        let result = serde_json::to_value(self.resources.read(&context, &params.uri).await?)?;
        if let Some(cache) = &self.cache {
            cache.put_resource(&params.uri, result.clone());
        }
        Ok(result)
    }

    fn handle_prompts_list(&self) -> Result<Value, McpError> {
        let result = PromptsListResult { prompts: prompts::get_all_prompts(), next_cursor: None };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_prompts_get(&self, params: Value) -> Result<Value, McpError> {
        let params: PromptGetParams = parse_params("prompts/get", params)?;
        Ok(serde_json::to_value(prompts::get_prompt(&params.name, params.arguments)?)?)
    }

    fn error_response(&self, id: Option<JsonRpcId>, error: McpError) -> JsonRpcResponse {
        error!(error = %error, code = error.error_code(), "MCP request failed");
        JsonRpcResponse::failure(id, error.into())
    }
}

fn parse_params<T: DeserializeOwned>(method: &str, params: Value) -> Result<T, McpError> {
    serde_json::from_value(params)
        .map_err(|e| McpError::InvalidParams(format!("Failed to parse {} params: {}", method, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{SessionContext, VaultClient, VaultSettings};
    use tracing_test::traced_test;

    fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(JsonRpcId::Number(id)),
            method: method.to_string(),
            params,
        }
    }

    fn offline_handler() -> McpHandler {
        McpHandler::new(Arc::new(SessionLifecycle::new()), &CacheConfig::default())
            .expect("handler builds")
    }

    fn active_handler() -> McpHandler {
        let settings = VaultSettings::with_overrides(
            Some("http://127.0.0.1:1".to_string()),
            Some("root".to_string()),
        );
        let client = VaultClient::new(&settings).expect("offline client");
        let lifecycle = SessionLifecycle::activated(SessionContext::new(client));
        McpHandler::new(Arc::new(lifecycle), &CacheConfig::default()).expect("handler builds")
    }

    #[test]
    fn test_negotiate_version() {
        assert_eq!(negotiate_version("2024-11-05"), "2024-11-05");
        assert_eq!(negotiate_version("2025-06-18"), "2025-06-18");
        assert_eq!(negotiate_version("1999-01-01"), PROTOCOL_VERSION);
        assert_eq!(negotiate_version(""), PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_initialize() {
        let handler = offline_handler();
        let params = json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0"}
        });
        let response = handler.handle_request(request(1, "initialize", params)).await.expect("response");
        let result = response.result.expect("result");

        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "Vault");
        assert_eq!(result["serverInfo"]["version"], crate::VERSION);
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert!(result["instructions"].as_str().is_some_and(|s| s.contains("Vault")));
    }

    #[tokio::test]
    async fn test_initialize_requires_client_info() {
        let handler = offline_handler();
        let response = handler
            .handle_request(request(1, "initialize", json!({"protocolVersion": "2025-06-18"})))
            .await
            .expect("response");
        assert_eq!(response.error.expect("error").code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let handler = offline_handler();
        let notification = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: "notifications/initialized".to_string(),
            params: Value::Null,
        };
        assert!(handler.handle_request(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_ping_and_unknown_method() {
        let handler = offline_handler();

        let response = handler.handle_request(request(2, "ping", Value::Null)).await.expect("ping");
        assert_eq!(response.result, Some(json!({})));

        let response =
            handler.handle_request(request(3, "sampling/create", Value::Null)).await.expect("reply");
        let error = response.error.expect("error");
        assert_eq!(error.code, error_codes::METHOD_NOT_FOUND);
        assert_eq!(response.id, Some(JsonRpcId::Number(3)));
    }

    #[tokio::test]
    async fn test_bad_jsonrpc_version() {
        let handler = offline_handler();
        let mut bad = request(4, "ping", Value::Null);
        bad.jsonrpc = "1.0".to_string();
        let response = handler.handle_request(bad).await.expect("reply");
        assert_eq!(response.error.expect("error").code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_tools_list_contains_catalogue() {
        let handler = offline_handler();
        let response =
            handler.handle_request(request(5, "tools/list", json!({}))).await.expect("reply");
        let tools = response.result.expect("result")["tools"].as_array().cloned().expect("array");
        assert_eq!(tools.len(), 87);
        assert_eq!(tools[0]["name"], "audit-device-enable");
    }

    #[tokio::test]
    async fn test_tools_call_without_session() {
        let handler = offline_handler();
        let params = json!({"name": "policies-list", "arguments": {}});
        let response =
            handler.handle_request(request(6, "tools/call", params)).await.expect("reply");
        assert_eq!(response.error.expect("error").code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_tool_and_resource() {
        let handler = active_handler();

        let response = handler
            .handle_request(request(7, "tools/call", json!({"name": "kv2-nope"})))
            .await
            .expect("reply");
        let error = response.error.expect("error");
        assert_eq!(error.code, error_codes::METHOD_NOT_FOUND);
        assert!(error.message.contains("kv2-nope"));

        let response = handler
            .handle_request(request(8, "resources/read", json!({"uri": "kv2://nothing"})))
            .await
            .expect("reply");
        assert_eq!(response.error.expect("error").code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_transport_failure_becomes_tool_error() {
        let handler = active_handler();
        let params = json!({"name": "policies-list", "arguments": {}});
        let response =
            handler.handle_request(request(9, "tools/call", params)).await.expect("reply");
        let result = response.result.expect("tool result");
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().is_some_and(|t| t.contains("Transport")));
        assert!(logs_contain("Tool execution failed"));
    }

    #[tokio::test]
    async fn test_prompts() {
        let handler = offline_handler();
        let response =
            handler.handle_request(request(10, "prompts/list", Value::Null)).await.expect("reply");
        let prompts = response.result.expect("result")["prompts"].as_array().cloned().expect("list");
        assert_eq!(prompts.len(), 2);

        let params = json!({"name": "generate-acl-policy", "arguments": {"paths": "secret/data/app"}});
        let response = handler.handle_request(request(11, "prompts/get", params)).await.expect("reply");
        let text = response.result.expect("result")["messages"][0]["content"]["text"].clone();
        assert!(text.as_str().is_some_and(|t| t.contains("path \"secret/data/app\"")));

        let response = handler
            .handle_request(request(12, "prompts/get", json!({"name": "missing"})))
            .await
            .expect("reply");
        assert_eq!(response.error.expect("error").code, error_codes::METHOD_NOT_FOUND);
    }
}
