//! Session context shared by every tool execution.

use std::sync::Arc;

use super::client::VaultClient;
use super::database::Database;
use super::kv2::Kv2;
use super::pki::Pki;
use super::sys::Sys;
use super::transit::Transit;

/// Per-session mapping from domain to remote-operation handle.
///
/// Built once when a session becomes active and never mutated; every
/// handle shares the same authenticated connection.
#[derive(Debug, Clone)]
pub struct SessionContext {
    client: Arc<VaultClient>,
    sys: Sys,
    kv2: Kv2,
    pki: Pki,
    database: Database,
    transit: Transit,
}

impl SessionContext {
    pub fn new(client: VaultClient) -> Self {
        let client = Arc::new(client);
        Self {
            sys: Sys::new(Arc::clone(&client)),
            kv2: Kv2::new(Arc::clone(&client)),
            pki: Pki::new(Arc::clone(&client)),
            database: Database::new(Arc::clone(&client)),
            transit: Transit::new(Arc::clone(&client)),
            client,
        }
    }

    /// The raw authenticated connection.
    pub fn client(&self) -> &VaultClient {
        &self.client
    }

    /// System backend: audit, auth methods, mounts, policies.
    pub fn sys(&self) -> &Sys {
        &self.sys
    }

    /// KV v2 storage.
    pub fn kv2(&self) -> &Kv2 {
        &self.kv2
    }

    pub fn pki(&self) -> &Pki {
        &self.pki
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn transit(&self) -> &Transit {
        &self.transit
    }
}
