//! # Vault Client
//!
//! Raw HTTP client for the Vault API, the factory that authenticates it,
//! and typed per-domain handles grouped into a [`SessionContext`].

pub mod client;
pub mod database;
pub mod error;
pub mod kv2;
pub mod pki;
pub mod session;
pub mod sys;
pub mod transit;

pub use client::{construct_client, construct_client_from, VaultClient, VaultSettings, DEFAULT_VAULT_URL};
pub use error::{Result, VaultError};
pub use session::SessionContext;
