//! Session lifecycle
//!
//! Two-state machine owning the [`SessionContext`]. The context is built once
//! through the client factory when the server starts and is dropped on
//! shutdown; a failed start leaves the machine uninitialized.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::mcp::error::McpError;
use crate::vault::{self, construct_client_from, SessionContext, VaultSettings};

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Uninitialized,
    Active(Arc<SessionContext>),
}

/// Publishes the shared Vault session to the protocol layer.
#[derive(Debug, Default)]
pub struct SessionLifecycle {
    state: RwLock<SessionState>,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle that is already active with the given context.
    pub fn activated(context: SessionContext) -> Self {
        Self { state: RwLock::new(SessionState::Active(Arc::new(context))) }
    }

    /// Construct the client and publish the session.
    ///
    /// Returns the existing context without contacting Vault when already active.
    pub async fn start(&self, settings: &VaultSettings) -> vault::Result<Arc<SessionContext>> {
        let mut state = self.state.write().await;
        if let SessionState::Active(context) = &*state {
            return Ok(Arc::clone(context));
        }

        let client = construct_client_from(settings).await.inspect_err(|e| {
            warn!(error = %e, "Vault session failed to start");
        })?;
        let context = Arc::new(SessionContext::new(client));
        *state = SessionState::Active(Arc::clone(&context));

        info!(address = %context.client().address(), "Vault session active");
        Ok(context)
    }

    /// The active session, or `NotInitialized` when there is none.
    pub async fn context(&self) -> Result<Arc<SessionContext>, McpError> {
        match &*self.state.read().await {
            SessionState::Active(context) => Ok(Arc::clone(context)),
            SessionState::Uninitialized => Err(McpError::NotInitialized),
        }
    }

    pub async fn is_active(&self) -> bool {
        matches!(&*self.state.read().await, SessionState::Active(_))
    }

    /// Drop the session. Executions already holding the context finish normally.
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        if matches!(&*state, SessionState::Active(_)) {
            info!("Vault session closed");
        }
        *state = SessionState::Uninitialized;
    }
}
