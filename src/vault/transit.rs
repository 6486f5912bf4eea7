//! Transit secrets engine: named encryption keys and encrypt/decrypt.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use vaultrs::transit::key;

use super::client::VaultClient;
use super::error::Result;

/// Conventional mount point for the transit engine.
pub const DEFAULT_TRANSIT_MOUNT: &str = "transit";

/// Handle for transit mounts.
#[derive(Debug, Clone)]
pub struct Transit {
    client: Arc<VaultClient>,
}

impl Transit {
    pub fn new(client: Arc<VaultClient>) -> Self {
        Self { client }
    }

    pub async fn create_key<B: Serialize>(&self, mount: &str, name: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/keys/{}", mount, name), body).await
    }

    pub async fn update_key_configuration<B: Serialize>(
        &self,
        mount: &str,
        name: &str,
        body: &B,
    ) -> Result<Option<Value>> {
        self.client.post(&format!("{}/keys/{}/config", mount, name), body).await
    }

    pub async fn read_key(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/keys/{}", mount, name)).await
    }

    pub async fn list_keys(&self, mount: &str) -> Result<Vec<String>> {
        Ok(key::list(self.client.api(), mount).await?.keys)
    }

    /// Vault refuses unless the key's config has `deletion_allowed` set.
    pub async fn delete_key(&self, mount: &str, name: &str) -> Result<()> {
        Ok(key::delete(self.client.api(), mount, name).await?)
    }

    pub async fn rotate_key(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.post(&format!("{}/keys/{}/rotate", mount, name), &serde_json::json!({})).await
    }

    /// Encrypt; `body.plaintext` must already be base64 encoded.
    pub async fn encrypt<B: Serialize>(&self, mount: &str, name: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/encrypt/{}", mount, name), body).await
    }

    pub async fn decrypt<B: Serialize>(&self, mount: &str, name: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/decrypt/{}", mount, name), body).await
    }

    pub async fn generate_random_bytes<B: Serialize>(&self, mount: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/random", mount), body).await
    }
}
