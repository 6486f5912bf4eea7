//! Authentication method tools (`sys/auth`).

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use super::{data, object_schema, parse_args, status, string_property};
use crate::mcp::error::McpError;
use crate::mcp::registry::{SideEffect, ToolDescriptor};
use crate::vault::SessionContext;

const TAG: &str = "authentication";

fn mount_schema(description: &str) -> Value {
    object_schema(json!({ "mount": string_property(description) }), &["mount"])
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "authentication-engine-enable",
            TAG,
            SideEffect::CreateOrUpdate,
            "Enable an authentication method (userpass, approle, kubernetes, ...). The mount defaults to the method name.",
            object_schema(
                json!({
                    "engine": string_property("Authentication method type, e.g. userpass or approle"),
                    "mount": string_property("Path at which to mount the method"),
                    "description": string_property("Human-friendly description"),
                    "config": {
                        "type": "object",
                        "description": "Mount configuration such as default_lease_ttl or max_lease_ttl",
                    },
                    "local": { "type": "boolean", "description": "Mark the mount as local-only" },
                }),
                &["engine"],
            ),
            |ctx, args| execute_enable_auth_method(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "authentication-engine-disable",
            TAG,
            SideEffect::Destructive,
            "Disable the authentication method mounted at the given path.",
            mount_schema("Mount path of the authentication method"),
            |ctx, args| execute_disable_auth_method(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "authentication-engines-list",
            TAG,
            SideEffect::ReadOnly,
            "List all enabled authentication methods, keyed by mount path.",
            object_schema(json!({}), &[]),
            |ctx, _args| execute_list_auth_methods(ctx).boxed(),
        ),
        ToolDescriptor::new(
            "authentication-engine-read",
            TAG,
            SideEffect::ReadOnly,
            "Read the tuning configuration of an authentication method.",
            mount_schema("Mount path of the authentication method"),
            |ctx, args| execute_read_auth_method(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "authentication-engine-tune",
            TAG,
            SideEffect::CreateOrUpdate,
            "Tune the configuration (lease TTLs, audit keys, visibility) of an authentication method.",
            object_schema(
                json!({
                    "mount": string_property("Mount path of the authentication method"),
                    "description": string_property("Human-friendly description"),
                    "default_lease_ttl": string_property("Default lease duration, e.g. 1h"),
                    "max_lease_ttl": string_property("Maximum lease duration, e.g. 24h"),
                    "audit_non_hmac_request_keys": { "type": "array", "items": { "type": "string" } },
                    "audit_non_hmac_response_keys": { "type": "array", "items": { "type": "string" } },
                    "listing_visibility": string_property("Either 'unauth' or 'hidden'"),
                    "passthrough_request_headers": { "type": "array", "items": { "type": "string" } },
                }),
                &["mount"],
            ),
            |ctx, args| execute_tune_auth_method(ctx, args).boxed(),
        ),
    ]
}

#[derive(Debug, Deserialize, Serialize)]
struct EnableAuthMethodArgs {
    #[serde(rename(serialize = "type"))]
    engine: String,
    #[serde(default, skip_serializing)]
    mount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct MountArgs {
    mount: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct TuneAuthMethodArgs {
    #[serde(skip_serializing)]
    mount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_lease_ttl: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_lease_ttl: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audit_non_hmac_request_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audit_non_hmac_response_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    listing_visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    passthrough_request_headers: Option<Vec<String>>,
}

#[instrument(skip(ctx, args), name = "mcp_execute_authentication_engine_enable")]
pub async fn execute_enable_auth_method(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: EnableAuthMethodArgs = parse_args("authentication-engine-enable", args)?;
    let mount = args.mount.clone().unwrap_or_else(|| args.engine.clone());

    tracing::info!(engine = %args.engine, mount = %mount, "Enabling authentication method");
    status(ctx.sys().enable_auth_method(&mount, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_authentication_engine_disable")]
pub async fn execute_disable_auth_method(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("authentication-engine-disable", args)?;

    tracing::info!(mount = %args.mount, "Disabling authentication method");
    status(ctx.sys().disable_auth_method(&args.mount).await)
}

#[instrument(skip(ctx), name = "mcp_execute_authentication_engines_list")]
pub async fn execute_list_auth_methods(ctx: &SessionContext) -> Result<Value, McpError> {
    Ok(data(ctx.sys().list_auth_methods().await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_authentication_engine_read")]
pub async fn execute_read_auth_method(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("authentication-engine-read", args)?;
    Ok(data(ctx.sys().read_auth_method_tuning(&args.mount).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_authentication_engine_tune")]
pub async fn execute_tune_auth_method(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: TuneAuthMethodArgs = parse_args("authentication-engine-tune", args)?;

    tracing::info!(mount = %args.mount, "Tuning authentication method");
    status(ctx.sys().tune_auth_method(&args.mount, &args).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_body_uses_type_field() {
        let args: EnableAuthMethodArgs =
            parse_args("authentication-engine-enable", json!({"engine": "userpass"}))
                .expect("valid args");
        assert_eq!(serde_json::to_value(&args).expect("serialize"), json!({"type": "userpass"}));
        assert!(args.mount.is_none());
    }

    #[test]
    fn test_tune_body_skips_mount() {
        let args: TuneAuthMethodArgs = parse_args(
            "authentication-engine-tune",
            json!({"mount": "userpass", "max_lease_ttl": "24h"}),
        )
        .expect("valid args");
        assert_eq!(serde_json::to_value(&args).expect("serialize"), json!({"max_lease_ttl": "24h"}));
    }
}
