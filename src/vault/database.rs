//! Database secrets engine: connections, dynamic roles and static roles.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use vaultrs::database::{connection, role, static_role};

use super::client::VaultClient;
use super::error::Result;

/// Conventional mount point for the database engine.
pub const DEFAULT_DATABASE_MOUNT: &str = "database";

/// Handle for database mounts.
#[derive(Debug, Clone)]
pub struct Database {
    client: Arc<VaultClient>,
}

impl Database {
    pub fn new(client: Arc<VaultClient>) -> Self {
        Self { client }
    }

    // ------------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------------

    pub async fn configure_connection<B: Serialize>(&self, mount: &str, name: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/config/{}", mount, name), body).await
    }

    pub async fn read_connection(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/config/{}", mount, name)).await
    }

    pub async fn list_connections(&self, mount: &str) -> Result<Vec<String>> {
        Ok(connection::list(self.client.api(), mount).await?.keys)
    }

    pub async fn delete_connection(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.delete(&format!("{}/config/{}", mount, name)).await
    }

    pub async fn reset_connection(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.post(&format!("{}/reset/{}", mount, name), &json!({})).await
    }

    pub async fn rotate_root_credentials(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.post(&format!("{}/rotate-root/{}", mount, name), &json!({})).await
    }

    // ------------------------------------------------------------------------
    // Dynamic roles
    // ------------------------------------------------------------------------

    pub async fn create_role<B: Serialize>(&self, mount: &str, name: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/roles/{}", mount, name), body).await
    }

    pub async fn read_role(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/roles/{}", mount, name)).await
    }

    pub async fn list_roles(&self, mount: &str) -> Result<Vec<String>> {
        Ok(role::list(self.client.api(), mount).await?.keys)
    }

    pub async fn delete_role(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.delete(&format!("{}/roles/{}", mount, name)).await
    }

    /// Fresh dynamic credentials for a role.
    pub async fn generate_credentials(&self, mount: &str, name: &str) -> Result<Value> {
        let creds = role::creds(self.client.api(), mount, name).await?;
        Ok(json!({ "username": creds.username, "password": creds.password }))
    }

    // ------------------------------------------------------------------------
    // Static roles
    // ------------------------------------------------------------------------

    pub async fn create_static_role<B: Serialize>(&self, mount: &str, name: &str, body: &B) -> Result<Option<Value>> {
        self.client.post(&format!("{}/static-roles/{}", mount, name), body).await
    }

    pub async fn read_static_role(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/static-roles/{}", mount, name)).await
    }

    pub async fn list_static_roles(&self, mount: &str) -> Result<Vec<String>> {
        Ok(static_role::list(self.client.api(), mount).await?.keys)
    }

    pub async fn delete_static_role(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.delete(&format!("{}/static-roles/{}", mount, name)).await
    }

    pub async fn get_static_credentials(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.get(&format!("{}/static-creds/{}", mount, name)).await
    }

    pub async fn rotate_static_role_credentials(&self, mount: &str, name: &str) -> Result<Option<Value>> {
        self.client.post(&format!("{}/rotate-role/{}", mount, name), &json!({})).await
    }
}
