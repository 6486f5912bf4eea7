//! KV version 2 secrets engine.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use vaultrs::kv2;

use super::client::VaultClient;
use super::error::Result;

/// Conventional mount point for the KV v2 engine.
pub const DEFAULT_KV2_MOUNT: &str = "secret";

/// Handle for KV v2 mounts.
#[derive(Debug, Clone)]
pub struct Kv2 {
    client: Arc<VaultClient>,
}

impl Kv2 {
    pub fn new(client: Arc<VaultClient>) -> Self {
        Self { client }
    }

    /// Write a new version and return its metadata. `kv2::set` carries no
    /// check-and-set option, so CAS writes go through the raw endpoint.
    pub async fn create_or_update(
        &self,
        mount: &str,
        path: &str,
        data: &Value,
        cas: Option<u64>,
    ) -> Result<Value> {
        match cas {
            None => {
                let metadata = kv2::set(self.client.api(), mount, path, data).await?;
                Ok(json!({
                    "created_time": metadata.created_time,
                    "deletion_time": metadata.deletion_time,
                    "destroyed": metadata.destroyed,
                    "version": metadata.version,
                }))
            }
            Some(cas) => {
                let body = json!({ "data": data, "options": { "cas": cas } });
                Ok(envelope_data(self.client.post(&format!("{}/data/{}", mount, path), &body).await?))
            }
        }
    }

    /// The secret's key/value pairs at the latest or a given version.
    pub async fn read(&self, mount: &str, path: &str, version: Option<u64>) -> Result<Value> {
        let secret: Value = match version {
            Some(version) => kv2::read_version(self.client.api(), mount, path, version).await?,
            None => kv2::read(self.client.api(), mount, path).await?,
        };
        Ok(secret)
    }

    /// Merge `data` into the latest version using Vault's native PATCH.
    pub async fn patch(&self, mount: &str, path: &str, data: &Value, cas: Option<u64>) -> Result<Value> {
        let mut body = json!({ "data": data });
        if let Some(cas) = cas {
            body["options"] = json!({ "cas": cas });
        }
        Ok(envelope_data(self.client.merge_patch(&format!("{}/data/{}", mount, path), &body).await?))
    }

    pub async fn list(&self, mount: &str, path: &str) -> Result<Vec<String>> {
        Ok(kv2::list(self.client.api(), mount, path).await?)
    }

    pub async fn read_metadata(&self, mount: &str, path: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/metadata/{}", mount, path)).await
    }

    pub async fn update_metadata<B: Serialize>(&self, mount: &str, path: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/metadata/{}", mount, path), body).await
    }

    /// Remove all versions and metadata at a path.
    pub async fn delete_metadata_and_all_versions(&self, mount: &str, path: &str) -> Result<()> {
        Ok(kv2::delete_metadata(self.client.api(), mount, path).await?)
    }

    pub async fn delete_latest_version(&self, mount: &str, path: &str) -> Result<()> {
        Ok(kv2::delete_latest(self.client.api(), mount, path).await?)
    }

    pub async fn delete_versions(&self, mount: &str, path: &str, versions: &[u64]) -> Result<()> {
        Ok(kv2::delete_versions(self.client.api(), mount, path, versions.to_vec()).await?)
    }

    pub async fn undelete_versions(&self, mount: &str, path: &str, versions: &[u64]) -> Result<()> {
        Ok(kv2::undelete_versions(self.client.api(), mount, path, versions.to_vec()).await?)
    }

    pub async fn destroy_versions(&self, mount: &str, path: &str, versions: &[u64]) -> Result<()> {
        Ok(kv2::destroy_versions(self.client.api(), mount, path, versions.to_vec()).await?)
    }

    pub async fn configure<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/config", mount), body).await
    }

    pub async fn read_configuration(&self, mount: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/config", mount)).await
    }
}

fn envelope_data(response: Option<Value>) -> Value {
    response
        .and_then(|mut body| body.get_mut("data").map(Value::take))
        .filter(|data| !data.is_null())
        .unwrap_or_else(|| json!({}))
}
