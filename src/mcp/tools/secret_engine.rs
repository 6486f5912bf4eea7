//! Secret engine lifecycle tools (`sys/mounts`, `sys/remount`).

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use super::{data, object_schema, parse_args, status, string_property};
use crate::mcp::error::McpError;
use crate::mcp::registry::{SideEffect, ToolDescriptor};
use crate::vault::SessionContext;

const TAG: &str = "secret-engine";

fn mount_schema() -> Value {
    object_schema(json!({ "mount": string_property("Mount path of the secret engine") }), &["mount"])
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "secret-engine-enable",
            TAG,
            SideEffect::CreateOrUpdate,
            "Enable a secret engine (kv, pki, transit, database, ...). The mount defaults to the engine name. Use options {\"version\": \"2\"} for KV version 2.",
            object_schema(
                json!({
                    "engine": string_property("Secret engine type, e.g. kv, pki, transit or database"),
                    "mount": string_property("Path at which to mount the engine"),
                    "description": string_property("Human-friendly description"),
                    "config": {
                        "type": "object",
                        "description": "Mount configuration such as default_lease_ttl or max_lease_ttl",
                    },
                    "options": { "type": "object", "description": "Engine-specific options" },
                    "local": { "type": "boolean", "default": false },
                    "seal_wrap": { "type": "boolean", "default": false },
                }),
                &["engine"],
            ),
            |ctx, args| execute_enable(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "secret-engine-disable",
            TAG,
            SideEffect::Destructive,
            "Disable the secret engine at the given mount. All data stored in it is lost.",
            mount_schema(),
            |ctx, args| execute_disable(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "secret-engines-list",
            TAG,
            SideEffect::ReadOnly,
            "List all enabled secret engines, keyed by mount path.",
            object_schema(json!({}), &[]),
            |ctx, _args| execute_list(ctx).boxed(),
        ),
        ToolDescriptor::new(
            "secret-engine-move",
            TAG,
            SideEffect::CreateOrUpdate,
            "Move a secret engine from one mount path to another.",
            object_schema(
                json!({
                    "from": string_property("Current mount path"),
                    "to": string_property("New mount path"),
                }),
                &["from", "to"],
            ),
            |ctx, args| execute_move(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "secret-engine-read-configuration",
            TAG,
            SideEffect::ReadOnly,
            "Read the tuning configuration of a secret engine mount.",
            mount_schema(),
            |ctx, args| execute_read_configuration(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "secret-engine-tune-configuration",
            TAG,
            SideEffect::CreateOrUpdate,
            "Tune the configuration (lease TTLs, options, visibility) of a secret engine mount.",
            object_schema(
                json!({
                    "mount": string_property("Mount path of the secret engine"),
                    "description": string_property("Human-friendly description"),
                    "default_lease_ttl": string_property("Default lease duration, e.g. 1h"),
                    "max_lease_ttl": string_property("Maximum lease duration, e.g. 24h"),
                    "options": { "type": "object", "description": "Engine-specific options" },
                    "listing_visibility": string_property("Either 'unauth' or 'hidden'"),
                }),
                &["mount"],
            ),
            |ctx, args| execute_tune_configuration(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "secret-engine-retrieve-option",
            TAG,
            SideEffect::ReadOnly,
            "Retrieve a single option (e.g. version) of a mounted secret engine. Returns null when unset.",
            object_schema(
                json!({
                    "mount": string_property("Mount path of the secret engine"),
                    "option": string_property("Option name, e.g. version"),
                }),
                &["mount", "option"],
            ),
            |ctx, args| execute_retrieve_option(ctx, args).boxed(),
        ),
    ]
}

#[derive(Debug, Deserialize, Serialize)]
struct EnableArgs {
    #[serde(rename(serialize = "type"))]
    engine: String,
    #[serde(default, skip_serializing)]
    mount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Value>,
    #[serde(default)]
    local: bool,
    #[serde(default)]
    seal_wrap: bool,
}

#[derive(Debug, Deserialize)]
struct MountArgs {
    mount: String,
}

#[derive(Debug, Deserialize)]
struct MoveArgs {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct TuneArgs {
    #[serde(skip_serializing)]
    mount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_lease_ttl: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_lease_ttl: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    listing_visibility: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OptionArgs {
    mount: String,
    option: String,
}

#[instrument(skip(ctx, args), name = "mcp_execute_secret_engine_enable")]
pub async fn execute_enable(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: EnableArgs = parse_args("secret-engine-enable", args)?;
    let mount = args.mount.clone().unwrap_or_else(|| args.engine.clone());

    tracing::info!(engine = %args.engine, mount = %mount, "Enabling secret engine");
    status(ctx.sys().enable_secrets_engine(&mount, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_secret_engine_disable")]
pub async fn execute_disable(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("secret-engine-disable", args)?;

    tracing::warn!(mount = %args.mount, "Disabling secret engine");
    status(ctx.sys().disable_secrets_engine(&args.mount).await)
}

#[instrument(skip(ctx), name = "mcp_execute_secret_engines_list")]
pub async fn execute_list(ctx: &SessionContext) -> Result<Value, McpError> {
    Ok(data(ctx.sys().list_secrets_engines().await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_secret_engine_move")]
pub async fn execute_move(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MoveArgs = parse_args("secret-engine-move", args)?;

    tracing::info!(from = %args.from, to = %args.to, "Moving secret engine");
    status(ctx.sys().move_secrets_engine(&args.from, &args.to).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_secret_engine_read_configuration")]
pub async fn execute_read_configuration(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("secret-engine-read-configuration", args)?;
    Ok(data(ctx.sys().read_mount_configuration(&args.mount).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_secret_engine_tune_configuration")]
pub async fn execute_tune_configuration(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: TuneArgs = parse_args("secret-engine-tune-configuration", args)?;

    tracing::info!(mount = %args.mount, "Tuning secret engine");
    status(ctx.sys().tune_mount_configuration(&args.mount, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_secret_engine_retrieve_option")]
pub async fn execute_retrieve_option(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: OptionArgs = parse_args("secret-engine-retrieve-option", args)?;
    let mounts = data(ctx.sys().list_secrets_engines().await?);
    Ok(mount_option(&mounts, &args.mount, &args.option))
}

/// Look up `options[option]` of a mount in a `sys/mounts` listing, whose
/// keys carry a trailing slash.
fn mount_option(mounts: &Value, mount: &str, option: &str) -> Value {
    let key = format!("{}/", mount.trim_end_matches('/'));
    mounts
        .get(&key)
        .and_then(|entry| entry.get("options"))
        .and_then(|options| options.get(option))
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_body() {
        let args: EnableArgs = parse_args(
            "secret-engine-enable",
            json!({"engine": "kv", "mount": "secret", "options": {"version": "2"}}),
        )
        .expect("valid args");
        assert_eq!(
            serde_json::to_value(&args).expect("serialize"),
            json!({"type": "kv", "options": {"version": "2"}, "local": false, "seal_wrap": false})
        );
    }

    #[test]
    fn test_mount_option_lookup() {
        let mounts = json!({
            "secret/": {"type": "kv", "options": {"version": "2"}},
            "transit/": {"type": "transit", "options": null},
        });
        assert_eq!(mount_option(&mounts, "secret", "version"), json!("2"));
        assert_eq!(mount_option(&mounts, "secret/", "version"), json!("2"));
        assert_eq!(mount_option(&mounts, "transit", "version"), Value::Null);
        assert_eq!(mount_option(&mounts, "missing", "version"), Value::Null);
    }
}
