//! MCP Tools Module
//!
//! One module per Vault domain. Every tool parses its arguments into a typed
//! struct, makes a single call through the matching handle on the
//! [`SessionContext`](crate::vault::SessionContext) and reshapes the answer:
//!
//! - status-flag mutations (no payload from Vault) become `{"success": bool}`,
//!   with `error` set when Vault rejected the request
//! - reads unwrap the `data` envelope
//! - lists return a bare array of names; a handful of lists over domains
//!   that may legitimately be empty map Vault's 404 to `[]`

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::mcp::error::McpError;
use crate::vault::{self, VaultError};

pub mod audit;
pub mod auth;
pub mod database;
pub mod kv2;
pub mod pki;
pub mod policy;
pub mod secret_engine;
pub mod transit;

// -----------------------------------------------------------------------------
// Argument parsing
// -----------------------------------------------------------------------------

/// Deserialize tool arguments, treating a missing argument object as `{}`.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, McpError> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| McpError::InvalidParams(format!("Invalid arguments for {}: {}", tool, e)))
}

// -----------------------------------------------------------------------------
// Input schema helpers
// -----------------------------------------------------------------------------

/// Object schema with the given properties and required keys.
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

pub(crate) fn string_property(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

pub(crate) fn mount_property(default: &str) -> Value {
    json!({
        "type": "string",
        "description": "Mount point of the secrets engine",
        "default": default,
    })
}

// -----------------------------------------------------------------------------
// Result shaping
// -----------------------------------------------------------------------------

/// Outcome of a mutation that Vault acknowledges without a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResult {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

/// Reshape a status-flag mutation. Rejections reported by Vault become
/// `{success: false, error}`; transport failures still propagate.
pub(crate) fn status<T>(result: vault::Result<T>) -> Result<Value, McpError> {
    let status = match result {
        Ok(_) => StatusResult::ok(),
        Err(err @ VaultError::RemoteOperation { .. }) => {
            tracing::warn!(error = %err, "Vault rejected mutation");
            StatusResult::failed(err.detail())
        }
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::to_value(status)?)
}

/// The `data` envelope of a response, or the body itself when there is none.
pub(crate) fn data(response: Option<Value>) -> Value {
    match response {
        Some(Value::Object(mut body)) => match body.remove("data") {
            Some(data) if !data.is_null() => data,
            _ => Value::Object(body),
        },
        Some(other) => other,
        None => json!({}),
    }
}

/// The payload if Vault returned one, otherwise `{"success": true}`.
pub(crate) fn data_or_success(response: Option<Value>) -> Result<Value, McpError> {
    match response {
        Some(body) => Ok(data(Some(body))),
        None => Ok(serde_json::to_value(StatusResult::ok())?),
    }
}

/// `data.keys` as a bare array.
pub(crate) fn keys(response: Option<Value>) -> Value {
    let mut body = data(response);
    match body.get_mut("keys").map(Value::take) {
        Some(keys @ Value::Array(_)) => keys,
        _ => json!([]),
    }
}

/// Listed names, mapping a not-found answer to an empty list.
pub(crate) fn keys_or_empty(result: vault::Result<Vec<String>>) -> Result<Value, McpError> {
    match result {
        Ok(names) => Ok(json!(names)),
        Err(err) if err.is_not_found() => Ok(json!([])),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args_accepts_null() {
        #[derive(serde::Deserialize)]
        struct Args {
            #[serde(default)]
            mount: Option<String>,
        }
        let args: Args = parse_args("demo", Value::Null).expect("null args");
        assert!(args.mount.is_none());
    }

    #[test]
    fn test_parse_args_reports_missing_fields() {
        #[derive(Debug, serde::Deserialize)]
        struct Args {
            #[allow(dead_code)]
            name: String,
        }
        let err = parse_args::<Args>("policy-read", json!({})).expect_err("missing name");
        assert!(matches!(err, McpError::InvalidParams(_)));
        assert!(err.to_string().contains("policy-read"));
    }

    #[test]
    fn test_status_success() {
        assert_eq!(status(Ok(())).expect("status"), json!({"success": true}));
    }

    #[test]
    fn test_status_remote_failure_is_flagged() {
        let result = status::<()>(Err(VaultError::remote(400, vec!["path is already in use".into()])));
        assert_eq!(
            result.expect("status"),
            json!({"success": false, "error": "path is already in use"})
        );
    }

    #[test]
    fn test_status_transport_failure_propagates() {
        let result = status::<()>(Err(VaultError::Transport { message: "connection refused".into() }));
        assert!(matches!(result, Err(McpError::Vault(VaultError::Transport { .. }))));
    }

    #[test]
    fn test_data_unwraps_envelope() {
        let body = json!({"request_id": "x", "data": {"name": "mypolicy"}});
        assert_eq!(data(Some(body)), json!({"name": "mypolicy"}));
        assert_eq!(data(Some(json!({"sealed": false}))), json!({"sealed": false}));
        assert_eq!(data(None), json!({}));
    }

    #[test]
    fn test_keys_extracts_names() {
        let body = json!({"data": {"keys": ["a", "b/"]}});
        assert_eq!(keys(Some(body)), json!(["a", "b/"]));
        assert_eq!(keys(None), json!([]));
    }

    #[test]
    fn test_keys_or_empty_suppresses_not_found_only() {
        assert_eq!(keys_or_empty(Err(VaultError::remote(404, vec![]))).expect("empty"), json!([]));
        assert_eq!(keys_or_empty(Ok(vec!["mykey".to_string()])).expect("names"), json!(["mykey"]));
        let err = keys_or_empty(Err(VaultError::remote(403, vec!["permission denied".into()])));
        assert!(err.is_err());
    }

    #[test]
    fn test_data_or_success() {
        assert_eq!(data_or_success(None).expect("shape"), json!({"success": true}));
        assert_eq!(
            data_or_success(Some(json!({"data": {"name": "k"}}))).expect("shape"),
            json!({"name": "k"})
        );
    }
}
