//! Audit device tools (`sys/audit`).

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use super::{data, object_schema, parse_args, status, string_property};
use crate::mcp::error::McpError;
use crate::mcp::registry::{SideEffect, ToolDescriptor};
use crate::vault::SessionContext;

const TAG: &str = "audit";

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "audit-device-enable",
            TAG,
            SideEffect::CreateOrUpdate,
            "Enable a new audit device at the supplied path. The path defaults to the device type.",
            object_schema(
                json!({
                    "type": string_property("Type of the audit device: file, syslog or socket"),
                    "path": string_property("Path at which to enable the device"),
                    "description": string_property("Human-friendly description"),
                    "options": {
                        "type": "object",
                        "description": "Device-specific options, e.g. {\"file_path\": \"/var/log/vault_audit.log\"}",
                    },
                    "local": {
                        "type": "boolean",
                        "description": "Mark the device as local-only (not replicated)",
                    },
                }),
                &["type"],
            ),
            |ctx, args| execute_enable_audit_device(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "audit-device-disable",
            TAG,
            SideEffect::Destructive,
            "Disable the audit device at the given path.",
            object_schema(json!({ "path": string_property("Path of the audit device") }), &["path"]),
            |ctx, args| execute_disable_audit_device(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "audit-devices-list",
            TAG,
            SideEffect::ReadOnly,
            "List all enabled audit devices, keyed by path.",
            object_schema(json!({}), &[]),
            |ctx, _args| execute_list_audit_devices(ctx).boxed(),
        ),
    ]
}

#[derive(Debug, Deserialize, Serialize)]
struct EnableAuditDeviceArgs {
    #[serde(rename = "type")]
    device_type: String,
    #[serde(default, skip_serializing)]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    path: String,
}

#[instrument(skip(ctx, args), name = "mcp_execute_audit_device_enable")]
pub async fn execute_enable_audit_device(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: EnableAuditDeviceArgs = parse_args("audit-device-enable", args)?;
    let path = args.path.clone().unwrap_or_else(|| args.device_type.clone());

    tracing::info!(device_type = %args.device_type, path = %path, "Enabling audit device");
    status(ctx.sys().enable_audit_device(&path, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_audit_device_disable")]
pub async fn execute_disable_audit_device(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: PathArgs = parse_args("audit-device-disable", args)?;

    tracing::info!(path = %args.path, "Disabling audit device");
    status(ctx.sys().disable_audit_device(&args.path).await)
}

#[instrument(skip(ctx), name = "mcp_execute_audit_devices_list")]
pub async fn execute_list_audit_devices(ctx: &SessionContext) -> Result<Value, McpError> {
    Ok(data(ctx.sys().list_audit_devices().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors() {
        let names: Vec<_> = descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["audit-device-enable", "audit-device-disable", "audit-devices-list"]);
    }

    #[test]
    fn test_enable_body_omits_path_and_unset_fields() {
        let args: EnableAuditDeviceArgs = parse_args(
            "audit-device-enable",
            json!({"type": "file", "path": "file-audit", "options": {"file_path": "stdout"}}),
        )
        .expect("valid args");
        let body = serde_json::to_value(&args).expect("serialize");
        assert_eq!(body, json!({"type": "file", "options": {"file_path": "stdout"}}));
    }
}
