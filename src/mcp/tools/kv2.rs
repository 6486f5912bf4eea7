//! KV version 2 tools.
//!
//! Reads return the secret's key/value pairs (`data.data`), writes return the
//! version metadata Vault reports, and deletions are status flags.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use super::{data, keys_or_empty, mount_property, object_schema, parse_args, status, string_property};
use crate::mcp::error::McpError;
use crate::mcp::registry::{SideEffect, ToolDescriptor};
use crate::vault::kv2::DEFAULT_KV2_MOUNT;
use crate::vault::SessionContext;

const TAG: &str = "key-value-v2";

fn default_mount() -> String {
    DEFAULT_KV2_MOUNT.to_string()
}

fn path_schema() -> Value {
    object_schema(
        json!({
            "mount": mount_property(DEFAULT_KV2_MOUNT),
            "path": string_property("Path of the secret within the mount"),
        }),
        &["path"],
    )
}

fn versions_schema() -> Value {
    object_schema(
        json!({
            "mount": mount_property(DEFAULT_KV2_MOUNT),
            "path": string_property("Path of the secret within the mount"),
            "versions": {
                "type": "array",
                "items": { "type": "integer", "minimum": 1 },
                "description": "Version numbers to act on",
            },
        }),
        &["path", "versions"],
    )
}

fn secret_schema() -> Value {
    object_schema(
        json!({
            "mount": mount_property(DEFAULT_KV2_MOUNT),
            "path": string_property("Path of the secret within the mount"),
            "secret": {
                "type": "object",
                "description": "Key/value pairs to store",
                "additionalProperties": true,
            },
            "cas": {
                "type": "integer",
                "description": "Check-and-set version; the write only succeeds if the current version matches",
            },
        }),
        &["path", "secret"],
    )
}

fn metadata_settings_schema(with_path: bool) -> Value {
    let mut properties = json!({
        "mount": mount_property(DEFAULT_KV2_MOUNT),
        "max_versions": { "type": "integer", "description": "Number of versions to keep per key" },
        "cas_required": { "type": "boolean", "description": "Require check-and-set on all writes" },
        "delete_version_after": string_property("Duration after which versions are deleted, e.g. 768h"),
    });
    if with_path {
        properties["path"] = string_property("Path of the secret within the mount");
        properties["custom_metadata"] = json!({
            "type": "object",
            "description": "Arbitrary string metadata describing the secret",
            "additionalProperties": { "type": "string" },
        });
        object_schema(properties, &["path"])
    } else {
        object_schema(properties, &[])
    }
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "kv2-create-or-update",
            TAG,
            SideEffect::CreateOrUpdate,
            "Create a new version of a secret at the given path. Returns the version metadata.",
            secret_schema(),
            |ctx, args| execute_create_or_update(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-read",
            TAG,
            SideEffect::ReadOnly,
            "Read the key/value pairs of a secret, optionally at a specific version.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_KV2_MOUNT),
                    "path": string_property("Path of the secret within the mount"),
                    "version": { "type": "integer", "description": "Version to read; latest when omitted" },
                }),
                &["path"],
            ),
            |ctx, args| execute_read(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-list",
            TAG,
            SideEffect::ReadOnly,
            "List secret names under a path. Returns an empty list when nothing exists there.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_KV2_MOUNT),
                    "path": {
                        "type": "string",
                        "description": "Folder to list; the mount root when omitted",
                        "default": "",
                    },
                }),
                &[],
            ),
            |ctx, args| execute_list(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-delete",
            TAG,
            SideEffect::Destructive,
            "Permanently delete a secret: all versions and its metadata.",
            path_schema(),
            |ctx, args| execute_delete(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-undelete",
            TAG,
            SideEffect::CreateOrUpdate,
            "Restore soft-deleted versions of a secret.",
            versions_schema(),
            |ctx, args| execute_undelete(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-patch",
            TAG,
            SideEffect::CreateOrUpdate,
            "Merge the supplied key/value pairs into the latest version of a secret.",
            secret_schema(),
            |ctx, args| execute_patch(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-metadata-and-versions",
            TAG,
            SideEffect::ReadOnly,
            "Read a secret's metadata and the state of each of its versions.",
            path_schema(),
            |ctx, args| execute_read_metadata(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-update-metadata",
            TAG,
            SideEffect::CreateOrUpdate,
            "Update a secret's metadata: version limits, CAS requirement, expiry and custom metadata.",
            metadata_settings_schema(true),
            |ctx, args| execute_update_metadata(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-configure-backend",
            TAG,
            SideEffect::CreateOrUpdate,
            "Configure engine-wide defaults for a KV v2 mount.",
            metadata_settings_schema(false),
            |ctx, args| execute_configure_backend(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-read-backend-configuration",
            TAG,
            SideEffect::ReadOnly,
            "Read the engine-wide configuration of a KV v2 mount.",
            object_schema(json!({ "mount": mount_property(DEFAULT_KV2_MOUNT) }), &[]),
            |ctx, args| execute_read_backend_configuration(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-delete-latest-version",
            TAG,
            SideEffect::Destructive,
            "Soft-delete the latest version of a secret.",
            path_schema(),
            |ctx, args| execute_delete_latest_version(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-delete-specific-versions",
            TAG,
            SideEffect::Destructive,
            "Soft-delete the given versions of a secret.",
            versions_schema(),
            |ctx, args| execute_delete_versions(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "kv2-destroy-versions",
            TAG,
            SideEffect::Destructive,
            "Permanently destroy the data of the given versions of a secret.",
            versions_schema(),
            |ctx, args| execute_destroy_versions(ctx, args).boxed(),
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    #[serde(default = "default_mount")]
    mount: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct ListArgs {
    #[serde(default = "default_mount")]
    mount: String,
    #[serde(default)]
    path: String,
}

#[derive(Debug, Deserialize)]
struct ReadArgs {
    #[serde(default = "default_mount")]
    mount: String,
    path: String,
    #[serde(default)]
    version: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SecretArgs {
    #[serde(default = "default_mount")]
    mount: String,
    path: String,
    secret: Value,
    #[serde(default)]
    cas: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct VersionsArgs {
    #[serde(default = "default_mount")]
    mount: String,
    path: String,
    versions: Vec<u64>,
}

#[derive(Debug, Deserialize, Serialize)]
struct MetadataArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(default, skip_serializing)]
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_versions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cas_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delete_version_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MountArgs {
    #[serde(default = "default_mount")]
    mount: String,
}

fn require_object(tool: &str, secret: &Value) -> Result<(), McpError> {
    if secret.is_object() {
        Ok(())
    } else {
        Err(McpError::InvalidParams(format!("{}: 'secret' must be an object", tool)))
    }
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_create_or_update")]
pub async fn execute_create_or_update(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: SecretArgs = parse_args("kv2-create-or-update", args)?;
    require_object("kv2-create-or-update", &args.secret)?;

    tracing::info!(mount = %args.mount, path = %args.path, "Writing secret");
    Ok(ctx.kv2().create_or_update(&args.mount, &args.path, &args.secret, args.cas).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_read")]
pub async fn execute_read(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: ReadArgs = parse_args("kv2-read", args)?;

    Ok(ctx.kv2().read(&args.mount, &args.path, args.version).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_list")]
pub async fn execute_list(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: ListArgs = parse_args("kv2-list", args)?;
    keys_or_empty(ctx.kv2().list(&args.mount, &args.path).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_delete")]
pub async fn execute_delete(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: PathArgs = parse_args("kv2-delete", args)?;

    tracing::info!(mount = %args.mount, path = %args.path, "Deleting secret and metadata");
    status(ctx.kv2().delete_metadata_and_all_versions(&args.mount, &args.path).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_undelete")]
pub async fn execute_undelete(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: VersionsArgs = parse_args("kv2-undelete", args)?;
    status(ctx.kv2().undelete_versions(&args.mount, &args.path, &args.versions).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_patch")]
pub async fn execute_patch(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: SecretArgs = parse_args("kv2-patch", args)?;
    require_object("kv2-patch", &args.secret)?;

    tracing::info!(mount = %args.mount, path = %args.path, cas = ?args.cas, "Patching secret");
    Ok(ctx.kv2().patch(&args.mount, &args.path, &args.secret, args.cas).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_metadata_and_versions")]
pub async fn execute_read_metadata(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: PathArgs = parse_args("kv2-metadata-and-versions", args)?;
    Ok(data(ctx.kv2().read_metadata(&args.mount, &args.path).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_update_metadata")]
pub async fn execute_update_metadata(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MetadataArgs = parse_args("kv2-update-metadata", args)?;
    if args.path.is_empty() {
        return Err(McpError::InvalidParams("kv2-update-metadata: 'path' is required".to_string()));
    }
    status(ctx.kv2().update_metadata(&args.mount, &args.path, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_configure_backend")]
pub async fn execute_configure_backend(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MetadataArgs = parse_args("kv2-configure-backend", args)?;
    status(ctx.kv2().configure(&args.mount, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_read_backend_configuration")]
pub async fn execute_read_backend_configuration(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("kv2-read-backend-configuration", args)?;
    Ok(data(ctx.kv2().read_configuration(&args.mount).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_delete_latest_version")]
pub async fn execute_delete_latest_version(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: PathArgs = parse_args("kv2-delete-latest-version", args)?;
    status(ctx.kv2().delete_latest_version(&args.mount, &args.path).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_delete_specific_versions")]
pub async fn execute_delete_versions(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: VersionsArgs = parse_args("kv2-delete-specific-versions", args)?;
    status(ctx.kv2().delete_versions(&args.mount, &args.path, &args.versions).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_kv2_destroy_versions")]
pub async fn execute_destroy_versions(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: VersionsArgs = parse_args("kv2-destroy-versions", args)?;

    tracing::warn!(mount = %args.mount, path = %args.path, versions = ?args.versions, "Destroying secret versions");
    status(ctx.kv2().destroy_versions(&args.mount, &args.path, &args.versions).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_defaults_to_secret() {
        let args: PathArgs = parse_args("kv2-read", json!({"path": "mysecret"})).expect("valid");
        assert_eq!(args.mount, "secret");
    }

    #[test]
    fn test_metadata_body_only_sends_settings() {
        let args: MetadataArgs = parse_args(
            "kv2-update-metadata",
            json!({"path": "app", "max_versions": 5, "custom_metadata": {"owner": "ops"}}),
        )
        .expect("valid");
        assert_eq!(
            serde_json::to_value(&args).expect("serialize"),
            json!({"max_versions": 5, "custom_metadata": {"owner": "ops"}})
        );
    }

    #[test]
    fn test_secret_must_be_object() {
        assert!(require_object("kv2-patch", &json!(["not", "an", "object"])).is_err());
        assert!(require_object("kv2-patch", &json!({"foo": "bar"})).is_ok());
    }
}
