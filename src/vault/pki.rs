//! PKI secrets engine: CA management, issuance, revocation and issuers.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use vaultrs::pki::{cert, role};

use super::client::VaultClient;
use super::error::Result;

/// Conventional mount point for the PKI engine.
pub const DEFAULT_PKI_MOUNT: &str = "pki";

/// Handle for PKI mounts.
#[derive(Debug, Clone)]
pub struct Pki {
    client: Arc<VaultClient>,
}

impl Pki {
    pub fn new(client: Arc<VaultClient>) -> Self {
        Self { client }
    }

    // ------------------------------------------------------------------------
    // Certificate authority
    // ------------------------------------------------------------------------

    /// Generate a root CA; `kind` is `internal`, `exported`, `existing` or `kms`.
    pub async fn generate_root<B: Serialize>(&self, mount: &str, kind: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/root/generate/{}", mount, kind), body).await
    }

    pub async fn delete_root(&self, mount: &str) -> Result<Option<Value>> {
        self.client.delete(&format!("{}/root", mount)).await
    }

    pub async fn read_ca_certificate(&self, mount: &str) -> Result<String> {
        self.client.get_text(&format!("{}/ca/pem", mount)).await
    }

    pub async fn read_ca_certificate_chain(&self, mount: &str) -> Result<String> {
        self.client.get_text(&format!("{}/ca_chain", mount)).await
    }

    pub async fn read_crl(&self, mount: &str) -> Result<String> {
        self.client.get_text(&format!("{}/crl/pem", mount)).await
    }

    pub async fn rotate_crl(&self, mount: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/crl/rotate", mount)).await
    }

    pub async fn generate_intermediate<B: Serialize>(
        &self,
        mount: &str,
        kind: &str,
        body: &B,
    ) -> Result<Option<Value>> {
        self.client.post(&format!("{}/intermediate/generate/{}", mount, kind), body).await
    }

    pub async fn set_signed_intermediate(&self, mount: &str, certificate: &str) -> Result<Option<Value>> {
        self.client
            .post(&format!("{}/intermediate/set-signed", mount), &json!({ "certificate": certificate }))
            .await
    }

    pub async fn sign_intermediate<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/root/sign-intermediate", mount), body).await
    }

    pub async fn sign_self_issued(&self, mount: &str, certificate: &str) -> Result<Option<Value>> {
        self.client
            .post(&format!("{}/root/sign-self-issued", mount), &json!({ "certificate": certificate }))
            .await
    }

    pub async fn submit_ca_information(&self, mount: &str, pem_bundle: &str) -> Result<Option<Value>> {
        self.client.post(&format!("{}/config/ca", mount), &json!({ "pem_bundle": pem_bundle })).await
    }

    // ------------------------------------------------------------------------
    // Leaf certificates
    // ------------------------------------------------------------------------

    pub async fn generate_certificate<B: Serialize>(&self, mount: &str, role: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/issue/{}", mount, role), body).await
    }

    pub async fn sign_certificate<B: Serialize>(&self, mount: &str, role: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/sign/{}", mount, role), body).await
    }

    pub async fn read_certificate(&self, mount: &str, serial: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/cert/{}", mount, serial)).await
    }

    /// Serial numbers of every issued certificate.
    pub async fn list_certificates(&self, mount: &str) -> Result<Vec<String>> {
        Ok(cert::list(self.client.api(), mount).await?)
    }

    pub async fn revoke_certificate(&self, mount: &str, serial: &str) -> Result<Option<Value>> {
        self.client.post(&format!("{}/revoke", mount), &json!({ "serial_number": serial })).await
    }

    pub async fn tidy<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/tidy", mount), body).await
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    pub async fn read_crl_configuration(&self, mount: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/config/crl", mount)).await
    }

    pub async fn set_crl_configuration<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/config/crl", mount), body).await
    }

    pub async fn read_urls(&self, mount: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/config/urls", mount)).await
    }

    pub async fn set_urls<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/config/urls", mount), body).await
    }

    // ------------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------------

    pub async fn create_or_update_role<B: Serialize>(&self, mount: &str, name: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/roles/{}", mount, name), body).await
    }

    pub async fn list_roles(&self, mount: &str) -> Result<Vec<String>> {
        Ok(role::list(self.client.api(), mount).await?.keys)
    }

    pub async fn read_role(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/roles/{}", mount, name)).await
    }

    pub async fn delete_role(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.delete(&format!("{}/roles/{}", mount, name)).await
    }

    // ------------------------------------------------------------------------
    // Issuers
    // ------------------------------------------------------------------------

    pub async fn read_issuer(&self, mount: &str, issuer_ref: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/issuer/{}", mount, issuer_ref)).await
    }

    pub async fn list_issuers(&self, mount: &str) -> Result<Vec<String>> {
        let response = self.client.list(&format!("{}/issuers", mount)).await?;
        Ok(response
            .as_ref()
            .and_then(|body| body.pointer("/data/keys"))
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).map(str::to_owned).collect())
            .unwrap_or_default())
    }

    pub async fn update_issuer<B: Serialize>(&self, mount: &str, issuer_ref: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/issuer/{}", mount, issuer_ref), body).await
    }

    pub async fn revoke_issuer(&self, mount: &str, issuer_ref: &str) -> Result<Option<Value>> {
        self.client.post(&format!("{}/issuer/{}/revoke", mount, issuer_ref), &json!({})).await
    }
}
