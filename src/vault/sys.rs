//! System backend (`/v1/sys/...`): audit devices, auth methods, secret
//! engine mounts and ACL policies.
//!
//! `vaultrs::sys::policy` targets the legacy `sys/policy` endpoints, so ACL
//! policies use `sys/policies/acl` directly.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::client::VaultClient;
use super::error::Result;

/// Handle for the `sys/` backend.
#[derive(Debug, Clone)]
pub struct Sys {
    client: Arc<VaultClient>,
}

impl Sys {
    pub fn new(client: Arc<VaultClient>) -> Self {
        Self { client }
    }

    // ------------------------------------------------------------------------
    // Audit devices
    // ------------------------------------------------------------------------

    pub async fn enable_audit_device<B: Serialize>(&self, path: &str, body: &B) -> Result<Option<Value>> {
        self.client.put(&format!("sys/audit/{}", path), body).await
    }

    pub async fn disable_audit_device(&self, path: &str) -> Result<Option<Value>> {
        self.client.delete(&format!("sys/audit/{}", path)).await
    }

    pub async fn list_audit_devices(&self) -> Result<Option<Value>> {
        self.client.get("sys/audit").await
    }

    // ------------------------------------------------------------------------
    // Auth methods
    // ------------------------------------------------------------------------

    pub async fn enable_auth_method<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("sys/auth/{}", mount), body).await
    }

    pub async fn disable_auth_method(&self, mount: &str) -> Result<Option<Value>> {
        self.client.delete(&format!("sys/auth/{}", mount)).await
    }

    pub async fn list_auth_methods(&self) -> Result<Option<Value>> {
        self.client.get("sys/auth").await
    }

    pub async fn read_auth_method_tuning(&self, mount: &str) -> Result<Option<Value>> {
        self.client.get(&format!("sys/auth/{}/tune", mount)).await
    }

    pub async fn tune_auth_method<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("sys/auth/{}/tune", mount), body).await
    }

    // ------------------------------------------------------------------------
    // Secret engine mounts
    // ------------------------------------------------------------------------

    pub async fn enable_secrets_engine<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("sys/mounts/{}", mount), body).await
    }

    pub async fn disable_secrets_engine(&self, mount: &str) -> Result<()> {
        Ok(vaultrs::sys::mount::disable(self.client.api(), mount).await?)
    }

    pub async fn list_secrets_engines(&self) -> Result<Option<Value>> {
        self.client.get("sys/mounts").await
    }

    pub async fn move_secrets_engine(&self, from: &str, to: &str) -> Result<Option<Value>> {
        self.client.post("sys/remount", &json!({ "from": from, "to": to })).await
    }

    pub async fn read_mount_configuration(&self, mount: &str) -> Result<Option<Value>> {
        self.client.get(&format!("sys/mounts/{}/tune", mount)).await
    }

    pub async fn tune_mount_configuration<B: Serialize>(
        &self,
        mount: &str,
        body: &B,
    ) -> Result<Option<Value>> {
        self.client.post(&format!("sys/mounts/{}/tune", mount), body).await
    }

    // ------------------------------------------------------------------------
    // ACL policies
    // ------------------------------------------------------------------------

    /// Write an ACL policy. `policy` is the policy document text (HCL or JSON).
    pub async fn write_acl_policy(&self, name: &str, policy: &str) -> Result<Option<Value>> {
        self.client.put(&format!("sys/policies/acl/{}", name), &json!({ "policy": policy })).await
    }

    pub async fn read_acl_policy(&self, name: &str) -> Result<Option<Value>> {
        self.client.get(&format!("sys/policies/acl/{}", name)).await
    }

    pub async fn list_acl_policies(&self) -> Result<Option<Value>> {
        self.client.list("sys/policies/acl").await
    }

    pub async fn delete_acl_policy(&self, name: &str) -> Result<Option<Value>> {
        self.client.delete(&format!("sys/policies/acl/{}", name)).await
    }
}
