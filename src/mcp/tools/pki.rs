//! PKI tools: certificate authority lifecycle, issuance, revocation, CRL and
//! URL configuration, roles and issuers.
//!
//! Tools that accept Vault parameters beyond the ones named in their schema
//! forward any additional arguments to Vault unchanged.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::instrument;

use super::{
    data, data_or_success, keys_or_empty, mount_property, object_schema, parse_args, status,
    string_property,
};
use crate::mcp::error::McpError;
use crate::mcp::registry::{SideEffect, ToolDescriptor};
use crate::vault::pki::DEFAULT_PKI_MOUNT;
use crate::vault::SessionContext;

const TAG: &str = "pki";

fn default_mount() -> String {
    DEFAULT_PKI_MOUNT.to_string()
}

fn default_kind() -> String {
    "internal".to_string()
}

/// Schema with the mount plus the given properties; extra parameters allowed.
fn pki_schema(mut properties: Value, required: &[&str]) -> Value {
    properties["mount"] = mount_property(DEFAULT_PKI_MOUNT);
    let mut schema = object_schema(properties, required);
    schema["additionalProperties"] = json!(true);
    schema
}

fn mount_only_schema() -> Value {
    object_schema(json!({ "mount": mount_property(DEFAULT_PKI_MOUNT) }), &[])
}

fn generate_schema(what: &str) -> Value {
    pki_schema(
        json!({
            "type": {
                "type": "string",
                "enum": ["internal", "exported", "existing", "kms"],
                "default": "internal",
                "description": format!("Key handling for the {}; 'exported' returns the private key", what),
            },
            "common_name": string_property("Requested common name"),
            "ttl": string_property("Requested time to live, e.g. 87600h"),
        }),
        &["common_name"],
    )
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        // Certificate authority
        ToolDescriptor::new(
            "pki-generate-root-ca",
            TAG,
            SideEffect::CreateOrUpdate,
            "Generate a new self-signed root CA for the mount.",
            generate_schema("root CA"),
            |ctx, args| execute_generate_root(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-delete-root-ca",
            TAG,
            SideEffect::Destructive,
            "Delete the current CA key and certificate of the mount.",
            mount_only_schema(),
            |ctx, args| execute_delete_root(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-read-root-ca",
            TAG,
            SideEffect::ReadOnly,
            "Read the CA certificate of the mount in PEM format.",
            mount_only_schema(),
            |ctx, args| execute_read_ca_certificate(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-read-root-ca-chain",
            TAG,
            SideEffect::ReadOnly,
            "Read the CA certificate chain of the mount in PEM format.",
            mount_only_schema(),
            |ctx, args| execute_read_ca_certificate_chain(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-read-crl",
            TAG,
            SideEffect::ReadOnly,
            "Read the current certificate revocation list in PEM format.",
            mount_only_schema(),
            |ctx, args| execute_read_crl(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-rotate-crl",
            TAG,
            SideEffect::CreateOrUpdate,
            "Force a rebuild of the certificate revocation list.",
            mount_only_schema(),
            |ctx, args| execute_rotate_crl(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-generate-intermediate",
            TAG,
            SideEffect::CreateOrUpdate,
            "Generate an intermediate CA key and CSR to be signed by a root CA.",
            generate_schema("intermediate CA"),
            |ctx, args| execute_generate_intermediate(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-set-signed-intermediate",
            TAG,
            SideEffect::CreateOrUpdate,
            "Import the signed intermediate certificate for a previously generated CSR.",
            pki_schema(
                json!({ "certificate": string_property("Signed certificate in PEM format") }),
                &["certificate"],
            ),
            |ctx, args| execute_set_signed_intermediate(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-sign-intermediate-certificate",
            TAG,
            SideEffect::CreateOrUpdate,
            "Sign an intermediate CA CSR with the mount's root CA.",
            pki_schema(
                json!({
                    "csr": string_property("Certificate signing request in PEM format"),
                    "common_name": string_property("Requested common name"),
                    "ttl": string_property("Requested time to live"),
                }),
                &["csr", "common_name"],
            ),
            |ctx, args| execute_sign_intermediate(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-sign-self-issued",
            TAG,
            SideEffect::CreateOrUpdate,
            "Sign a self-issued certificate with the mount's root CA.",
            pki_schema(
                json!({ "certificate": string_property("Self-issued certificate in PEM format") }),
                &["certificate"],
            ),
            |ctx, args| execute_sign_self_issued(ctx, args).boxed(),
        ),
        // Leaf certificates
        ToolDescriptor::new(
            "pki-generate-certificate",
            TAG,
            SideEffect::CreateOrUpdate,
            "Issue a new certificate and private key against a role.",
            pki_schema(
                json!({
                    "role": string_property("Role to issue against"),
                    "common_name": string_property("Requested common name"),
                    "alt_names": string_property("Comma-separated subject alternative names"),
                    "ttl": string_property("Requested time to live"),
                }),
                &["role", "common_name"],
            ),
            |ctx, args| execute_generate_certificate(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-sign-certificate",
            TAG,
            SideEffect::CreateOrUpdate,
            "Sign a certificate signing request against a role.",
            pki_schema(
                json!({
                    "role": string_property("Role to sign against"),
                    "csr": string_property("Certificate signing request in PEM format"),
                    "common_name": string_property("Requested common name"),
                    "ttl": string_property("Requested time to live"),
                }),
                &["role", "csr", "common_name"],
            ),
            |ctx, args| execute_sign_certificate(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-read-certificate",
            TAG,
            SideEffect::ReadOnly,
            "Read a certificate by serial number (or 'ca', 'crl', 'ca_chain').",
            pki_schema(json!({ "serial": string_property("Serial number, colon or hyphen separated") }), &["serial"]),
            |ctx, args| execute_read_certificate(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-list-certificates",
            TAG,
            SideEffect::ReadOnly,
            "List the serial numbers of issued certificates. Returns an empty list when none exist.",
            mount_only_schema(),
            |ctx, args| execute_list_certificates(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-revoke-certificate",
            TAG,
            SideEffect::Destructive,
            "Revoke a certificate by serial number.",
            pki_schema(json!({ "serial": string_property("Serial number of the certificate") }), &["serial"]),
            |ctx, args| execute_revoke_certificate(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-tidy-certificates",
            TAG,
            SideEffect::Destructive,
            "Remove expired certificates from storage and the revocation list.",
            pki_schema(
                json!({
                    "tidy_cert_store": { "type": "boolean", "default": true },
                    "tidy_revoked_certs": { "type": "boolean", "default": true },
                    "safety_buffer": string_property("Grace period after expiry, e.g. 72h"),
                }),
                &[],
            ),
            |ctx, args| execute_tidy(ctx, args).boxed(),
        ),
        // Configuration
        ToolDescriptor::new(
            "pki-read-crl-configuration",
            TAG,
            SideEffect::ReadOnly,
            "Read the CRL configuration of the mount.",
            mount_only_schema(),
            |ctx, args| execute_read_crl_configuration(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-set-crl-configuration",
            TAG,
            SideEffect::CreateOrUpdate,
            "Set the CRL configuration (expiry, disable, auto rebuild).",
            pki_schema(
                json!({
                    "expiry": string_property("Time the CRL is valid for, e.g. 72h"),
                    "disable": { "type": "boolean" },
                    "auto_rebuild": { "type": "boolean" },
                }),
                &[],
            ),
            |ctx, args| execute_set_crl_configuration(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-read-urls",
            TAG,
            SideEffect::ReadOnly,
            "Read the issuing certificate, CRL distribution and OCSP URLs.",
            mount_only_schema(),
            |ctx, args| execute_read_urls(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-set-urls",
            TAG,
            SideEffect::CreateOrUpdate,
            "Set the issuing certificate, CRL distribution and OCSP URLs.",
            pki_schema(
                json!({
                    "issuing_certificates": { "type": "array", "items": { "type": "string" } },
                    "crl_distribution_points": { "type": "array", "items": { "type": "string" } },
                    "ocsp_servers": { "type": "array", "items": { "type": "string" } },
                }),
                &[],
            ),
            |ctx, args| execute_set_urls(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-submit-ca-information",
            TAG,
            SideEffect::CreateOrUpdate,
            "Import a CA certificate and private key bundle.",
            pki_schema(
                json!({ "pem_bundle": string_property("PEM bundle with the CA key and certificate") }),
                &["pem_bundle"],
            ),
            |ctx, args| execute_submit_ca_information(ctx, args).boxed(),
        ),
        // Roles
        ToolDescriptor::new(
            "pki-create-update-role",
            TAG,
            SideEffect::CreateOrUpdate,
            "Create or update a role that constrains issued certificates.",
            pki_schema(
                json!({
                    "name": string_property("Role name"),
                    "allowed_domains": { "type": "array", "items": { "type": "string" } },
                    "allow_subdomains": { "type": "boolean" },
                    "allow_any_name": { "type": "boolean" },
                    "max_ttl": string_property("Maximum certificate lifetime"),
                }),
                &["name"],
            ),
            |ctx, args| execute_create_update_role(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-list-roles",
            TAG,
            SideEffect::ReadOnly,
            "List role names. Returns an empty list when none exist.",
            mount_only_schema(),
            |ctx, args| execute_list_roles(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-read-role",
            TAG,
            SideEffect::ReadOnly,
            "Read a role's configuration.",
            pki_schema(json!({ "name": string_property("Role name") }), &["name"]),
            |ctx, args| execute_read_role(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-delete-role",
            TAG,
            SideEffect::Destructive,
            "Delete a role. Certificates already issued are unaffected.",
            pki_schema(json!({ "name": string_property("Role name") }), &["name"]),
            |ctx, args| execute_delete_role(ctx, args).boxed(),
        ),
        // Issuers
        ToolDescriptor::new(
            "pki-read-issuer",
            TAG,
            SideEffect::ReadOnly,
            "Read an issuer by reference (id, name or 'default').",
            pki_schema(json!({ "issuer_ref": string_property("Issuer id, name or 'default'") }), &["issuer_ref"]),
            |ctx, args| execute_read_issuer(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-list-issuers",
            TAG,
            SideEffect::ReadOnly,
            "List issuer ids. Returns an empty list when none exist.",
            mount_only_schema(),
            |ctx, args| execute_list_issuers(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-update-issuer",
            TAG,
            SideEffect::CreateOrUpdate,
            "Update an issuer's name, usage or leaf behaviour.",
            pki_schema(
                json!({
                    "issuer_ref": string_property("Issuer id, name or 'default'"),
                    "issuer_name": string_property("New issuer name"),
                    "leaf_not_after_behavior": string_property("err, truncate or permit"),
                    "usage": string_property("Comma-separated usages, e.g. read-only,issuing-certificates,crl-signing"),
                }),
                &["issuer_ref"],
            ),
            |ctx, args| execute_update_issuer(ctx, args).boxed(),
        ),
        ToolDescriptor::new(
            "pki-revoke-issuer",
            TAG,
            SideEffect::Destructive,
            "Revoke an issuer so it can no longer issue certificates.",
            pki_schema(json!({ "issuer_ref": string_property("Issuer id, name or 'default'") }), &["issuer_ref"]),
            |ctx, args| execute_revoke_issuer(ctx, args).boxed(),
        ),
    ]
}

// -----------------------------------------------------------------------------
// Arguments
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MountArgs {
    #[serde(default = "default_mount")]
    mount: String,
}

/// Mount plus any Vault parameters, forwarded as the request body.
#[derive(Debug, Deserialize, Serialize)]
struct ParamsArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GenerateArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(rename = "type", default = "default_kind", skip_serializing)]
    kind: String,
    common_name: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RoleScopedArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    role: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CertificateArgs {
    #[serde(default = "default_mount")]
    mount: String,
    certificate: String,
}

#[derive(Debug, Deserialize)]
struct SerialArgs {
    #[serde(default = "default_mount")]
    mount: String,
    serial: String,
}

#[derive(Debug, Deserialize)]
struct PemBundleArgs {
    #[serde(default = "default_mount")]
    mount: String,
    pem_bundle: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct NamedArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    name: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize)]
struct IssuerArgs {
    #[serde(default = "default_mount", skip_serializing)]
    mount: String,
    #[serde(skip_serializing)]
    issuer_ref: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

// -----------------------------------------------------------------------------
// Certificate authority
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_pki_generate_root_ca")]
pub async fn execute_generate_root(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: GenerateArgs = parse_args("pki-generate-root-ca", args)?;

    tracing::info!(mount = %args.mount, common_name = %args.common_name, "Generating root CA");
    Ok(data(ctx.pki().generate_root(&args.mount, &args.kind, &args).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_delete_root_ca")]
pub async fn execute_delete_root(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-delete-root-ca", args)?;

    tracing::warn!(mount = %args.mount, "Deleting root CA");
    status(ctx.pki().delete_root(&args.mount).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_read_root_ca")]
pub async fn execute_read_ca_certificate(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-read-root-ca", args)?;
    Ok(Value::String(ctx.pki().read_ca_certificate(&args.mount).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_read_root_ca_chain")]
pub async fn execute_read_ca_certificate_chain(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-read-root-ca-chain", args)?;
    Ok(Value::String(ctx.pki().read_ca_certificate_chain(&args.mount).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_read_crl")]
pub async fn execute_read_crl(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-read-crl", args)?;
    Ok(Value::String(ctx.pki().read_crl(&args.mount).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_rotate_crl")]
pub async fn execute_rotate_crl(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-rotate-crl", args)?;
    data_or_success(ctx.pki().rotate_crl(&args.mount).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_generate_intermediate")]
pub async fn execute_generate_intermediate(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: GenerateArgs = parse_args("pki-generate-intermediate", args)?;

    tracing::info!(mount = %args.mount, common_name = %args.common_name, "Generating intermediate CSR");
    Ok(data(ctx.pki().generate_intermediate(&args.mount, &args.kind, &args).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_set_signed_intermediate")]
pub async fn execute_set_signed_intermediate(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: CertificateArgs = parse_args("pki-set-signed-intermediate", args)?;
    data_or_success(ctx.pki().set_signed_intermediate(&args.mount, &args.certificate).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_sign_intermediate_certificate")]
pub async fn execute_sign_intermediate(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: ParamsArgs = parse_args("pki-sign-intermediate-certificate", args)?;
    Ok(data(ctx.pki().sign_intermediate(&args.mount, &args).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_sign_self_issued")]
pub async fn execute_sign_self_issued(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: CertificateArgs = parse_args("pki-sign-self-issued", args)?;
    Ok(data(ctx.pki().sign_self_issued(&args.mount, &args.certificate).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_submit_ca_information")]
pub async fn execute_submit_ca_information(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: PemBundleArgs = parse_args("pki-submit-ca-information", args)?;
    data_or_success(ctx.pki().submit_ca_information(&args.mount, &args.pem_bundle).await?)
}

// -----------------------------------------------------------------------------
// Leaf certificates
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_pki_generate_certificate")]
pub async fn execute_generate_certificate(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: RoleScopedArgs = parse_args("pki-generate-certificate", args)?;

    tracing::info!(mount = %args.mount, role = %args.role, "Issuing certificate");
    Ok(data(ctx.pki().generate_certificate(&args.mount, &args.role, &args).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_sign_certificate")]
pub async fn execute_sign_certificate(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: RoleScopedArgs = parse_args("pki-sign-certificate", args)?;

    tracing::info!(mount = %args.mount, role = %args.role, "Signing certificate request");
    Ok(data(ctx.pki().sign_certificate(&args.mount, &args.role, &args).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_read_certificate")]
pub async fn execute_read_certificate(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: SerialArgs = parse_args("pki-read-certificate", args)?;
    Ok(data(ctx.pki().read_certificate(&args.mount, &args.serial).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_list_certificates")]
pub async fn execute_list_certificates(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-list-certificates", args)?;
    keys_or_empty(ctx.pki().list_certificates(&args.mount).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_revoke_certificate")]
pub async fn execute_revoke_certificate(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: SerialArgs = parse_args("pki-revoke-certificate", args)?;

    tracing::warn!(mount = %args.mount, serial = %args.serial, "Revoking certificate");
    Ok(data(ctx.pki().revoke_certificate(&args.mount, &args.serial).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_tidy_certificates")]
pub async fn execute_tidy(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let mut args: ParamsArgs = parse_args("pki-tidy-certificates", args)?;
    args.params.entry("tidy_cert_store").or_insert(json!(true));
    args.params.entry("tidy_revoked_certs").or_insert(json!(true));

    data_or_success(ctx.pki().tidy(&args.mount, &args).await?)
}

// -----------------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_pki_read_crl_configuration")]
pub async fn execute_read_crl_configuration(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-read-crl-configuration", args)?;
    Ok(data(ctx.pki().read_crl_configuration(&args.mount).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_set_crl_configuration")]
pub async fn execute_set_crl_configuration(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: ParamsArgs = parse_args("pki-set-crl-configuration", args)?;
    data_or_success(ctx.pki().set_crl_configuration(&args.mount, &args).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_read_urls")]
pub async fn execute_read_urls(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-read-urls", args)?;
    Ok(data(ctx.pki().read_urls(&args.mount).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_set_urls")]
pub async fn execute_set_urls(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: ParamsArgs = parse_args("pki-set-urls", args)?;
    status(ctx.pki().set_urls(&args.mount, &args).await)
}

// -----------------------------------------------------------------------------
// Roles
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_pki_create_update_role")]
pub async fn execute_create_update_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NamedArgs = parse_args("pki-create-update-role", args)?;

    tracing::info!(mount = %args.mount, role = %args.name, "Writing PKI role");
    data_or_success(ctx.pki().create_or_update_role(&args.mount, &args.name, &args).await?)
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_list_roles")]
pub async fn execute_list_roles(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-list-roles", args)?;
    keys_or_empty(ctx.pki().list_roles(&args.mount).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_read_role")]
pub async fn execute_read_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NamedArgs = parse_args("pki-read-role", args)?;
    Ok(data(ctx.pki().read_role(&args.mount, &args.name).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_delete_role")]
pub async fn execute_delete_role(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: NamedArgs = parse_args("pki-delete-role", args)?;
    status(ctx.pki().delete_role(&args.mount, &args.name).await)
}

// -----------------------------------------------------------------------------
// Issuers
// -----------------------------------------------------------------------------

#[instrument(skip(ctx, args), name = "mcp_execute_pki_read_issuer")]
pub async fn execute_read_issuer(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: IssuerArgs = parse_args("pki-read-issuer", args)?;
    Ok(data(ctx.pki().read_issuer(&args.mount, &args.issuer_ref).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_list_issuers")]
pub async fn execute_list_issuers(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: MountArgs = parse_args("pki-list-issuers", args)?;
    keys_or_empty(ctx.pki().list_issuers(&args.mount).await)
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_update_issuer")]
pub async fn execute_update_issuer(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: IssuerArgs = parse_args("pki-update-issuer", args)?;
    Ok(data(ctx.pki().update_issuer(&args.mount, &args.issuer_ref, &args).await?))
}

#[instrument(skip(ctx, args), name = "mcp_execute_pki_revoke_issuer")]
pub async fn execute_revoke_issuer(ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
    let args: IssuerArgs = parse_args("pki-revoke-issuer", args)?;

    tracing::warn!(mount = %args.mount, issuer = %args.issuer_ref, "Revoking issuer");
    Ok(data(ctx.pki().revoke_issuer(&args.mount, &args.issuer_ref).await?))
}
