//! Transit secrets engine tools: named keys, encryption as a service and
//! random bytes.
//!
//! Plaintext travels to Vault as standard base64 and comes back the same way;
//! both conversions happen here so callers deal in UTF-8 text only.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use super::{data, data_or_success, keys_or_empty, mount_property, object_schema, parse_args, status, string_property};
use crate::mcp::error::McpError;
use crate::mcp::registry::{SideEffect, ToolDescriptor};
use crate::vault::transit::DEFAULT_TRANSIT_MOUNT;
use crate::vault::{SessionContext, VaultError};

const TAG: &str = "transit";

fn default_mount() -> String {
    DEFAULT_TRANSIT_MOUNT.to_string()
}

fn default_random_format() -> String {
    "base64".to_string()
}

fn key_schema(description: &str) -> Value {
    object_schema(
        json!({
            "mount": mount_property(DEFAULT_TRANSIT_MOUNT),
            "name": string_property(description),
        }),
        &["name"],
    )
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "transit-encryption-key-create",
            TAG,
            SideEffect::CreateOrUpdate,
            "Create a named transit encryption key.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_TRANSIT_MOUNT),
                    "name": string_property("Name of the encryption key"),
                    "type": string_property("Key type, e.g. aes256-gcm96 (default), chacha20-poly1305, ed25519, rsa-2048"),
                    "convergent_encryption": { "type": "boolean", "description": "Same plaintext yields the same ciphertext; requires derived" },
                    "derived": { "type": "boolean", "description": "Require a derivation context on every request" },
                    "exportable": { "type": "boolean", "description": "Allow key export; cannot be disabled later" },
                    "allow_plaintext_backup": { "type": "boolean", "description": "Allow plaintext backups; cannot be disabled later" },
                    "auto_rotate_period": string_property("Automatic rotation period, e.g. 720h"),
                }),
                &["name"],
            ),
            |ctx, args| execute_create_key(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "transit-encryption-key-update-config",
            TAG,
            SideEffect::CreateOrUpdate,
            "Update the configuration of a transit encryption key.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_TRANSIT_MOUNT),
                    "name": string_property("Name of the encryption key"),
                    "min_decryption_version": { "type": "integer", "description": "Oldest key version allowed to decrypt" },
                    "min_encryption_version": { "type": "integer", "description": "Oldest key version allowed to encrypt; 0 means latest" },
                    "deletion_allowed": { "type": "boolean" },
                    "exportable": { "type": "boolean" },
                    "allow_plaintext_backup": { "type": "boolean" },
                    "auto_rotate_period": string_property("Automatic rotation period, e.g. 720h"),
                }),
                &["name"],
            ),
            |ctx, args| execute_update_key_configuration(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "transit-encryption-key-read",
            TAG,
            SideEffect::ReadOnly,
            "Read a transit encryption key's metadata and versions.",
            key_schema("Name of the encryption key"),
            |ctx, args| execute_read_key(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "transit-encryption-keys-list",
            TAG,
            SideEffect::ReadOnly,
            "List transit encryption key names. Returns an empty list when none exist.",
            object_schema(json!({ "mount": mount_property(DEFAULT_TRANSIT_MOUNT) }), &[]),
            |ctx, args| execute_list_keys(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "transit-encryption-key-delete",
            TAG,
            SideEffect::Destructive,
            "Delete a transit encryption key. The key must allow deletion.",
            key_schema("Name of the encryption key"),
            |ctx, args| execute_delete_key(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "transit-encryption-key-rotate",
            TAG,
            SideEffect::CreateOrUpdate,
            "Rotate a transit encryption key to a new version.",
            key_schema("Name of the encryption key"),
            |ctx, args| execute_rotate_key(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "transit-encrypt-plaintext",
            TAG,
            SideEffect::CreateOrUpdate,
            "Encrypt UTF-8 text with a transit key and return the ciphertext.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_TRANSIT_MOUNT),
                    "name": string_property("Name of the encryption key"),
                    "text": string_property("Plaintext to encrypt"),
                    "context": string_property("Base64 key derivation context, required for derived keys"),
                    "key_version": { "type": "integer", "description": "Key version to use; defaults to the latest" },
                    "nonce": string_property("Base64 nonce for convergent encryption"),
                    "associated_data": string_property("Base64 associated data for AEAD ciphers"),
                    "type": string_property("Key type to create when the key does not exist yet"),
                    "convergent_encryption": { "type": "boolean", "description": "Used only when the key is created by this call" },
                }),
                &["name", "text"],
            ),
            |ctx, args| execute_encrypt(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "transit-decrypt-ciphertext",
            TAG,
            SideEffect::CreateOrUpdate,
            "Decrypt a transit ciphertext (vault:v1:...) and return the UTF-8 plaintext.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_TRANSIT_MOUNT),
                    "name": string_property("Name of the encryption key"),
                    "text": string_property("Ciphertext to decrypt"),
                    "context": string_property("Base64 key derivation context"),
                    "nonce": string_property("Base64 nonce used during encryption"),
                    "associated_data": string_property("Base64 associated data for AEAD ciphers"),
                }),
                &["name", "text"],
            ),
            |ctx, args| execute_decrypt(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "transit-generate-random-bytes",
            TAG,
            SideEffect::CreateOrUpdate,
            "Generate high-quality random bytes from Vault.",
            object_schema(
                json!({
                    "mount": mount_property(DEFAULT_TRANSIT_MOUNT),
                    "num_bytes": { "type": "integer", "default": 32, "description": "Number of bytes to return" },
                    "format": {
                        "type": "string",
                        "enum": ["base64", "hex"],
                        "default": "base64",
                    },
                }),
                &[],
            ),
            |ctx, args| execute_generate_random_bytes(ctx, args).boxed(),
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct KeyArgs {
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
struct CreateKeyArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    key_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    convergent_encryption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    derived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exportable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allow_plaintext_backup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auto_rotate_period: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct KeyConfigArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_decryption_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_encryption_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deletion_allowed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exportable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allow_plaintext_backup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auto_rotate_period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EncryptArgs {
    #[serde(default = "default_mount")]
    mount: String,
    name: String,
    text: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    key_version: Option<u64>,
    #[serde(default)]
    nonce: Option<String>,
    #[serde(default)]
    associated_data: Option<String>,
    #[serde(rename = "type", default)]
    key_type: Option<String>,
    #[serde(default)]
    convergent_encryption: Option<bool>,
}

/// Request body for `{mount}/encrypt/{name}`.
#[derive(Debug, Serialize)]
struct EncryptBody<'a> {
    plaintext: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    associated_data: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    key_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    convergent_encryption: Option<bool>,
}

impl<'a> From<&'a EncryptArgs> for EncryptBody<'a> {
    fn from(args: &'a EncryptArgs) -> Self {
        Self {
            plaintext: STANDARD.encode(args.text.as_bytes()),
            context: args.context.as_deref(),
            key_version: args.key_version,
            nonce: args.nonce.as_deref(),
            associated_data: args.associated_data.as_deref(),
            key_type: args.key_type.as_deref(),
            convergent_encryption: args.convergent_encryption,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct DecryptArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    name: String,
    #[serde(rename(serialize = "ciphertext"))]
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    associated_data: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RandomArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(rename(serialize = "bytes"), alias = "bytes", default = "default_num_bytes")]
    num_bytes: u32,
    #[serde(default = "default_random_format")]
    format: String,
}

fn default_num_bytes() -> u32 {
    32
}

/// Pull a string field out of a `data` payload.
fn string_field(payload: &Value, field: &str) -> Result<String, McpError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| VaultError::unexpected(format!("response has no '{}' field", field)).into())
}

/// Decode Vault's base64 plaintext back into UTF-8 text.
fn decode_plaintext(encoded: &str) -> Result<String, McpError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| VaultError::unexpected(format!("plaintext is not valid base64: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| VaultError::unexpected(format!("plaintext is not valid UTF-8: {}", e)).into())
}

// -----------------------------------------------------------------------------
// Keys
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_transit_encryption_key_create")]
pub async fn execute_create_key(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: CreateKeyArgs = parse_args("transit-encryption-key-create", args)?;

    tracing::info!(mount = %args.mount, key = %args.name, "Creating transit key");
    data_or_success(ctx.transit().create_key(&args.mount, &args.name, &args).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_transit_encryption_key_update_config")]
pub async fn execute_update_key_configuration(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: KeyConfigArgs = parse_args("transit-encryption-key-update-config", args)?;
    data_or_success(ctx.transit().update_key_configuration(&args.mount, &args.name, &args).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_transit_encryption_key_read")]
pub async fn execute_read_key(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: KeyArgs = parse_args("transit-encryption-key-read", args)?;
    Ok(data(ctx.transit().read_key(&args.mount, &args.name).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_transit_encryption_keys_list")]
pub async fn execute_list_keys(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("transit-encryption-keys-list", args)?;
    keys_or_empty(ctx.transit().list_keys(&args.mount).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_transit_encryption_key_delete")]
pub async fn execute_delete_key(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: KeyArgs = parse_args("transit-encryption-key-delete", args)?;

    tracing::warn!(mount = %args.mount, key = %args.name, "Deleting transit key");
    status(ctx.transit().delete_key(&args.mount, &args.name).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_transit_encryption_key_rotate")]
pub async fn execute_rotate_key(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: KeyArgs = parse_args("transit-encryption-key-rotate", args)?;

    tracing::info!(mount = %args.mount, key = %args.name, "Rotating transit key");
    data_or_success(ctx.transit().rotate_key(&args.mount, &args.name).await?)
}

// -----------------------------------------------------------------------------
// Encryption as a service
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_transit_encrypt_plaintext")]
pub async fn execute_encrypt(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: EncryptArgs = parse_args("transit-encrypt-plaintext", args)?;
    let body = EncryptBody::from(&args);

    let payload = data(ctx.transit().encrypt(&args.mount, &args.name, &body).await?);
    Ok(Value::String(string_field(&payload, "ciphertext")?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_transit_decrypt_ciphertext")]
pub async fn execute_decrypt(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: DecryptArgs = parse_args("transit-decrypt-ciphertext", args)?;

    let payload = data(ctx.transit().decrypt(&args.mount, &args.name, &args).await?);
    let encoded = string_field(&payload, "plaintext")?;
    Ok(Value::String(decode_plaintext(&encoded)?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_transit_generate_random_bytes")]
pub async fn execute_generate_random_bytes(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: RandomArgs = parse_args("transit-generate-random-bytes", args)?;

    let payload = data(ctx.transit().generate_random_bytes(&args.mount, &args).await?);
    Ok(Value::String(string_field(&payload, "random_bytes")?))
}
