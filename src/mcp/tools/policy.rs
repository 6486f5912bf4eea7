//! ACL policy tools (`sys/policies/acl`).

use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use super::{data, keys, object_schema, parse_args, status, string_property};
use crate::mcp::error::McpError;
use crate::mcp::registry::{SideEffect, ToolDescriptor};
use crate::vault::SessionContext;

const TAG: &str = "acl-policy";

fn name_schema() -> Value {
    object_schema(json!({ "name": string_property("Name of the policy") }), &["name"])
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "policy-create-or-update",
            TAG,
            SideEffect::CreateOrUpdate,
            "Create or update an ACL policy. The policy is either a document of the form {\"path\": {\"secret/*\": {\"capabilities\": [\"read\"]}}} or raw HCL text.",
            object_schema(
                json!({
                    "name": string_property("Name of the policy"),
                    "policy": {
                        "type": ["object", "string"],
                        "description": "Policy document (JSON object) or HCL text",
                    },
                }),
                &["name", "policy"],
            ),
            |ctx, args| execute_create_or_update(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "policy-read",
            TAG,
            SideEffect::ReadOnly,
            "Read an ACL policy and its rules.",
            name_schema(),
            |ctx, args| execute_read(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "policies-list",
            TAG,
            SideEffect::ReadOnly,
            "List the names of all ACL policies, including the built-in default and root policies.",
            object_schema(json!({}), &[]),
            |ctx, _args| execute_list(ctx).boxed(),
        ),
        ToolDescriptor::new(
            "policy-delete",
            TAG,
            SideEffect::Destructive,
            "Delete an ACL policy.",
            name_schema(),
            |ctx, args| execute_delete(ctx, args).boxed(),
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct PolicyArgs {
    name: String,
    policy: Value,
}

#[derive(Debug, Deserialize)]
struct NameArgs {
    name: String,
}

/// Policy text as Vault stores it. JSON documents are valid HCL.
fn policy_text(policy: Value) -> Result<String, McpError> {
    match policy {
        Value::String(text) => Ok(text),
        document @ Value::Object(_) => Ok(serde_json::to_string(&document)?),
        other => Err(McpError::InvalidParams(format!(
            "Invalid arguments for policy-create-or-update: policy must be an object or a string, got {}",
            other
        ))),
    }
}

#[instrument(skip(ctx, args), name = "mcp_execute_policy_create_or_update")]
pub async fn execute_create_or_update(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: PolicyArgs = parse_args("policy-create-or-update", args)?;
    let text = policy_text(args.policy)?;

    tracing::info!(policy = %args.name, "Writing ACL policy");
    status(ctx.sys().write_acl_policy(&args.name, &text).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_policy_read")]
pub async fn execute_read(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("policy-read", args)?;
    Ok(data(ctx.sys().read_acl_policy(&args.name).await?))
}

#[instrument(skip(ctx), name = "mcp_execute_policies_list")]
pub async fn execute_list(ctx: &SessionContext) -> Result<Value, McpError> {
    Ok(keys(ctx.sys().list_acl_policies().await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_policy_delete")]
pub async fn execute_delete(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("policy-delete", args)?;

    tracing::info!(policy = %args.name, "Deleting ACL policy");
    status(ctx.sys().delete_acl_policy(&args.name).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_document_is_serialized_as_json_text() {
        let text = policy_text(json!({"path": {"secret/*": {"capabilities": ["read", "list"]}}}))
            .expect("object policy");
        let parsed: Value = serde_json::from_str(&text).expect("round trip");
        assert_eq!(parsed["path"]["secret/*"]["capabilities"], json!(["read", "list"]));
    }

    #[test]
    fn test_policy_hcl_passes_through() {
        let hcl = "path \"secret/*\" { capabilities = [\"read\"] }";
        assert_eq!(policy_text(json!(hcl)).expect("string policy"), hcl);
    }

    #[test]
    fn test_policy_rejects_other_shapes() {
        assert!(matches!(policy_text(json!([1, 2])), Err(McpError::InvalidParams(_))));
    }
}
