//! Database secrets engine tools: connections, dynamic roles and static roles.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::instrument;

use super::{data, keys_or_empty, mount_property, object_schema, parse_args, status, string_property};
use crate::mcp::error::McpError;
use crate::mcp::registry::{SideEffect, ToolDescriptor};
use crate::vault::database::DEFAULT_DATABASE_MOUNT;
use crate::vault::SessionContext;

const TAG: &str = "database";

/// Rotation period applied to static roles when none is given (one day).
const DEFAULT_ROTATION_PERIOD_SECS: u64 = 86_400;

fn default_mount() -> String {
    DEFAULT_DATABASE_MOUNT.to_string()
}

fn default_rotation_period() -> Value {
    json!(DEFAULT_ROTATION_PERIOD_SECS)
}

fn named_schema(what: &str) -> Value {
    object_schema(
        json!({
            "mount": mount_property(DEFAULT_DATABASE_MOUNT),
            "name": string_property(&format!("Name of the {}", what)),
        }),
        &["name"],
    )
}

fn mount_only_schema() -> Value {
    object_schema(json!({ "mount": mount_property(DEFAULT_DATABASE_MOUNT) }), &[])
}

fn statements_property(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        // Connections
        ToolDescriptor::new(
            "database-connection-configure",
            TAG,
            SideEffect::CreateOrUpdate,
            "Configure a database connection. Plugin-specific parameters such as connection_url, username and password are passed through.",
            {
                let mut schema = object_schema(
                    json!({
                        "mount": mount_property(DEFAULT_DATABASE_MOUNT),
                        "name": string_property("Name of the connection"),
                        "plugin_name": string_property("Database plugin, e.g. postgresql-database-plugin"),
                        "connection_url": string_property("Connection string template"),
                        "allowed_roles": { "type": "array", "items": { "type": "string" } },
                        "username": string_property("Privileged user Vault connects as"),
                        "password": string_property("Password of the privileged user"),
                        "verify_connection": { "type": "boolean", "default": true },
                    }),
                    &["name", "plugin_name"],
                );
                schema["additionalProperties"] = json!(true);
                schema
            },
            |ctx, args| execute_configure_connection(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-connection-read",
            TAG,
            SideEffect::ReadOnly,
            "Read the configuration of a database connection.",
            named_schema("connection"),
            |ctx, args| execute_read_connection(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-connections-list",
            TAG,
            SideEffect::ReadOnly,
            "List configured database connections. Returns an empty list when none exist.",
            mount_only_schema(),
            |ctx, args| execute_list_connections(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-connection-delete",
            TAG,
            SideEffect::Destructive,
            "Delete a database connection.",
            named_schema("connection"),
            |ctx, args| execute_delete_connection(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-connection-reset",
            TAG,
            SideEffect::CreateOrUpdate,
            "Close and reopen a database connection with its stored configuration.",
            named_schema("connection"),
            |ctx, args| execute_reset_connection(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-connection-rotate-root",
            TAG,
            SideEffect::CreateOrUpdate,
            "Rotate the root credentials Vault uses for a database connection.",
            named_schema("connection"),
            |ctx, args| execute_rotate_root(ctx, args).boxed(),
        ),
        // Dynamic roles
        ToolDescriptor::new(
            "database-role-create",
            TAG,
            SideEffect::CreateOrUpdate,
            "Create or update a dynamic role that issues short-lived database credentials.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_DATABASE_MOUNT),
                    "name": string_property("Name of the role"),
                    "db_name": string_property("Connection the role uses"),
                    "creation_statements": statements_property("Statements executed to create a user"),
                    "default_ttl": string_property("Default credential lifetime, e.g. 1h"),
                    "max_ttl": string_property("Maximum credential lifetime, e.g. 24h"),
                    "revocation_statements": statements_property("Statements executed to revoke a user"),
                    "rollback_statements": statements_property("Statements executed when creation fails"),
                    "renew_statements": statements_property("Statements executed to renew a user"),
                }),
                &["name", "db_name", "creation_statements"],
            ),
            |ctx, args| execute_create_role(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-role-read",
            TAG,
            SideEffect::ReadOnly,
            "Read a dynamic role.",
            named_schema("role"),
            |ctx, args| execute_read_role(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-roles-list",
            TAG,
            SideEffect::ReadOnly,
            "List dynamic roles. Returns an empty list when none exist.",
            mount_only_schema(),
            |ctx, args| execute_list_roles(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-role-delete",
            TAG,
            SideEffect::Destructive,
            "Delete a dynamic role.",
            named_schema("role"),
            |ctx, args| execute_delete_role(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-credentials-generate",
            TAG,
            SideEffect::CreateOrUpdate,
            "Generate a new set of credentials from a dynamic role.",
            named_schema("role"),
            |ctx, args| execute_generate_credentials(ctx, args).boxed(),
        ),
        // Static roles
        ToolDescriptor::new(
            "database-static-role-create",
            TAG,
            SideEffect::CreateOrUpdate,
            "Create or update a static role bound to an existing database user.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_DATABASE_MOUNT),
                    "name": string_property("Name of the static role"),
                    "db_name": string_property("Connection the role uses"),
                    "username": string_property("Existing database user"),
                    "rotation_statements": statements_property("Statements executed to rotate the password"),
                    "rotation_period": {
                        "type": ["integer", "string"],
                        "default": DEFAULT_ROTATION_PERIOD_SECS,
                        "description": "Seconds (or a duration string) between rotations",
                    },
                }),
                &["name", "db_name", "username"],
            ),
            |ctx, args| execute_create_static_role(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-static-role-read",
            TAG,
            SideEffect::ReadOnly,
            "Read a static role.",
            named_schema("static role"),
            |ctx, args| execute_read_static_role(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-static-roles-list",
            TAG,
            SideEffect::ReadOnly,
            "List static roles. Returns an empty list when none exist.",
            mount_only_schema(),
            |ctx, args| execute_list_static_roles(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-static-role-delete",
            TAG,
            SideEffect::Destructive,
            "Delete a static role.",
            named_schema("static role"),
            |ctx, args| execute_delete_static_role(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-static-credentials-get",
            TAG,
            SideEffect::ReadOnly,
            "Read the current credentials of a static role.",
            named_schema("static role"),
            |ctx, args| execute_get_static_credentials(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "database-static-credentials-rotate",
            TAG,
            SideEffect::CreateOrUpdate,
            "Rotate the password of a static role immediately.",
            named_schema("static role"),
            |ctx, args| execute_rotate_static_credentials(ctx, args).boxed(),
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct NameArgs {
    #[serde(default = "default_mount")]
    mount: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MountArgs {
    #[serde(default = "default_mount")]
    mount: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct ConnectionArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    name: String,
    plugin_name: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RoleArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    name: String,
    db_name: String,
    creation_statements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_ttl: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_ttl: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    revocation_statements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rollback_statements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    renew_statements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize)]
struct StaticRoleArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    name: String,
    db_name: String,
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation_statements: Option<Vec<String>>,
    #[serde(default = "default_rotation_period")]
    rotation_period: Value,
}

// -----------------------------------------------------------------------------
// Connections
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_database_connection_configure")]
pub async fn execute_configure_connection(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: ConnectionArgs = parse_args("database-connection-configure", args)?;

    tracing::info!(mount = %args.mount, connection = %args.name, plugin = %args.plugin_name, "Configuring database connection");
    status(ctx.database().configure_connection(&args.mount, &args.name, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_connection_read")]
pub async fn execute_read_connection(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-connection-read", args)?;
    Ok(data(ctx.database().read_connection(&args.mount, &args.name).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_connections_list")]
pub async fn execute_list_connections(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("database-connections-list", args)?;
    keys_or_empty(ctx.database().list_connections(&args.mount).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_connection_delete")]
pub async fn execute_delete_connection(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-connection-delete", args)?;

    tracing::info!(mount = %args.mount, connection = %args.name, "Deleting database connection");
    status(ctx.database().delete_connection(&args.mount, &args.name).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_connection_reset")]
pub async fn execute_reset_connection(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-connection-reset", args)?;
    status(ctx.database().reset_connection(&args.mount, &args.name).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_connection_rotate_root")]
pub async fn execute_rotate_root(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-connection-rotate-root", args)?;

    tracing::info!(mount = %args.mount, connection = %args.name, "Rotating database root credentials");
    status(ctx.database().rotate_root_credentials(&args.mount, &args.name).await)
}

// -----------------------------------------------------------------------------
// Dynamic roles
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_database_role_create")]
pub async fn execute_create_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: RoleArgs = parse_args("database-role-create", args)?;

    tracing::info!(mount = %args.mount, role = %args.name, db_name = %args.db_name, "Writing database role");
    status(ctx.database().create_role(&args.mount, &args.name, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_role_read")]
pub async fn execute_read_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-role-read", args)?;
    Ok(data(ctx.database().read_role(&args.mount, &args.name).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_roles_list")]
pub async fn execute_list_roles(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("database-roles-list", args)?;
    keys_or_empty(ctx.database().list_roles(&args.mount).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_role_delete")]
pub async fn execute_delete_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-role-delete", args)?;
    status(ctx.database().delete_role(&args.mount, &args.name).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_credentials_generate")]
pub async fn execute_generate_credentials(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-credentials-generate", args)?;
    Ok(ctx.database().generate_credentials(&args.mount, &args.name).await?)
}

// -----------------------------------------------------------------------------
// Static roles
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_database_static_role_create")]
pub async fn execute_create_static_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: StaticRoleArgs = parse_args("database-static-role-create", args)?;

    tracing::info!(mount = %args.mount, role = %args.name, username = %args.username, "Writing database static role");
    status(ctx.database().create_static_role(&args.mount, &args.name, &args).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_static_role_read")]
pub async fn execute_read_static_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-static-role-read", args)?;
    Ok(data(ctx.database().read_static_role(&args.mount, &args.name).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_static_roles_list")]
pub async fn execute_list_static_roles(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("database-static-roles-list", args)?;
    keys_or_empty(ctx.database().list_static_roles(&args.mount).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_static_role_delete")]
pub async fn execute_delete_static_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-static-role-delete", args)?;
    status(ctx.database().delete_static_role(&args.mount, &args.name).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_static_credentials_get")]
pub async fn execute_get_static_credentials(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-static-credentials-get", args)?;
    Ok(data(ctx.database().get_static_credentials(&args.mount, &args.name).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_database_static_credentials_rotate")]
pub async fn execute_rotate_static_credentials(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NameArgs = parse_args("database-static-credentials-rotate", args)?;
    status(ctx.database().rotate_static_role_credentials(&args.mount, &args.name).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_role_defaults_rotation_period() {
        let args: StaticRoleArgs = parse_args(
            "database-static-role-create",
            json!({"name": "app", "db_name": "pg", "username": "app_user"}),
        )
        .expect("valid args");
        let body = serde_json::to_value(&args).expect("serialize");
        assert_eq!(body, json!({"db_name": "pg", "username": "app_user", "rotation_period": 86400}));
    }

    #[test]
    fn test_role_requires_creation_statements() {
        let err = parse_args::<RoleArgs>("database-role-create", json!({"name": "ro", "db_name": "pg"}))
            .expect_err("missing statements");
        assert!(err.to_string().contains("creation_statements"));
    }

    #[test]
    fn test_connection_forwards_plugin_parameters() {
        let args: ConnectionArgs = parse_args(
            "database-connection-configure",
            json!({
                "name": "pg",
                "plugin_name": "postgresql-database-plugin",
                "connection_url": "postgresql://{{username}}:{{password}}@db:5432/app",
                "allowed_roles": ["ro"],
            }),
        )
        .expect("valid args");
        let body = serde_json::to_value(&args).expect("serialize");
        assert_eq!(body["plugin_name"], "postgresql-database-plugin");
        assert_eq!(body["allowed_roles"], json!(["ro"]));
        assert!(body.get("name").is_none());
        assert!(body.get("mount").is_none());
    }

    #[test]
    fn test_descriptor_count() {
        assert_eq!(descriptors().len(), 17);
    }
}
