//! MCP Resources Module
//!
//! Read-only JSON views over what is enabled and configured in Vault:
//! `audit://devices`, `auth://engines`, `secret://engines` and
//! `sys://policies`.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::mcp::error::McpError;
use crate::mcp::protocol::{Resource, ResourceContent, ResourceReadResult, ResourcesListResult};
use crate::mcp::registry::RegistryError;
use crate::mcp::tools::{data, keys};
use crate::vault::SessionContext;

pub const JSON_MIME_TYPE: &str = "application/json";

/// Reads the current value of a resource.
pub type ResourceReader = for<'a> fn(&'a SessionContext) -> BoxFuture<'a, Result<Value, McpError>>;

/// A resource exposed under a fixed URI.
#[derive(Clone)]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
    pub reader: ResourceReader,
}

impl std::fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("uri", &self.uri)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ResourceDescriptor {
    pub fn to_resource(&self) -> Resource {
        Resource {
            uri: self.uri.to_string(),
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            mime_type: Some(self.mime_type.to_string()),
        }
    }

    /// Read the resource and render it as pretty-printed JSON.
    pub async fn read(&self, ctx: &SessionContext) -> Result<ResourceReadResult, McpError> {
        let value = (self.reader)(ctx).await?;
        Ok(ResourceReadResult {
            contents: vec![ResourceContent {
                uri: self.uri.to_string(),
                mime_type: Some(self.mime_type.to_string()),
                text: serde_json::to_string_pretty(&value)?,
            }],
        })
    }
}

/// Resources keyed by URI, listed in registration order.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ResourceRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// All Vault resources.
    pub fn with_all_resources() -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        for descriptor in descriptors() {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Result<(), RegistryError> {
        if self.index.contains_key(descriptor.uri) {
            return Err(RegistryError::Duplicate(descriptor.uri.to_string()));
        }
        self.index.insert(descriptor.uri, self.resources.len());
        self.resources.push(descriptor);
        Ok(())
    }

    pub fn get(&self, uri: &str) -> Option<&ResourceDescriptor> {
        self.index.get(uri).map(|&position| &self.resources[position])
    }

    pub fn list(&self) -> ResourcesListResult {
        ResourcesListResult {
            resources: self.resources.iter().map(ResourceDescriptor::to_resource).collect(),
            next_cursor: None,
        }
    }

    pub async fn read(&self, ctx: &SessionContext, uri: &str) -> Result<ResourceReadResult, McpError> {
        let descriptor = self
            .get(uri)
            .ok_or_else(|| McpError::ResourceNotFound(format!("Resource not found: {}", uri)))?;

        debug!(uri = %uri, "Reading resource");
        descriptor.read(ctx).await
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

fn descriptors() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            uri: "audit://devices",
            name: "enabled-audit-devices",
            description: "List the available enabled Vault audit devices",
            mime_type: JSON_MIME_TYPE,
            reader: |ctx| async move { Ok(data(ctx.sys().list_audit_devices().await?)) }.boxed(),
        },
        ResourceDescriptor {
            uri: "auth://engines",
            name: "enabled-authentication-engines",
            description: "List the available enabled Vault authentication engines",
            mime_type: JSON_MIME_TYPE,
            reader: |ctx| async move { Ok(data(ctx.sys().list_auth_methods().await?)) }.boxed(),
        },
        ResourceDescriptor {
            uri: "sys://policies",
            name: "configured-acl-policies",
            description: "List the available configured Vault ACL policies",
            mime_type: JSON_MIME_TYPE,
            reader: |ctx| async move { Ok(keys(ctx.sys().list_acl_policies().await?)) }.boxed(),
        },
        ResourceDescriptor {
            uri: "secret://engines",
            name: "enabled-secret-engines",
            description: "List the available enabled Vault secret engines",
            mime_type: JSON_MIME_TYPE,
            reader: |ctx| async move { Ok(data(ctx.sys().list_secrets_engines().await?)) }.boxed(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_resources_registered() {
        let registry = ResourceRegistry::with_all_resources().expect("unique uris");
        let uris: Vec<_> = registry.list().resources.into_iter().map(|r| r.uri).collect();
        assert_eq!(uris, vec!["audit://devices", "auth://engines", "sys://policies", "secret://engines"]);
    }

    #[test]
    fn test_resources_are_json() {
        let registry = ResourceRegistry::with_all_resources().expect("unique uris");
        for resource in registry.list().resources {
            assert_eq!(resource.mime_type.as_deref(), Some(JSON_MIME_TYPE));
            assert!(resource.description.is_some());
        }
    }

    #[test]
    fn test_duplicate_uri_rejected() {
        let mut registry = ResourceRegistry::empty();
        let first = descriptors().remove(0);
        registry.register(first.clone()).expect("first registration");
        assert!(matches!(registry.register(first), Err(RegistryError::Duplicate(uri)) if uri == "audit://devices"));
        assert_eq!(registry.len(), 1);
    }
}
