//! MCP Tool Registry
//!
//! Static table of every tool exposed by the server. Each entry pairs an
//! external name with its executor, a side-effect class and a grouping tag.
//! The registry is built once per server and never mutated afterward.

use futures::future::BoxFuture;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::mcp::error::McpError;
use crate::mcp::protocol::{Tool, ToolAnnotations};
use crate::mcp::tools;
use crate::vault::SessionContext;

/// Future returned by a tool executor.
pub type ToolFuture<'a> = BoxFuture<'a, Result<Value, McpError>>;

/// Executes one tool against the live session.
pub type ToolExecutor = for<'a> fn(&'a SessionContext, Value) -> ToolFuture<'a>;

/// Side-effect classification of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideEffect {
    /// Idempotent read; results may be cached.
    ReadOnly,
    CreateOrUpdate,
    Destructive,
}

impl SideEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SideEffect::ReadOnly => "read-only",
            SideEffect::CreateOrUpdate => "create-or-update",
            SideEffect::Destructive => "destructive",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, SideEffect::ReadOnly)
    }

    /// MCP annotations for this class. Every tool talks to Vault, so all are open-world.
    pub fn annotations(&self) -> ToolAnnotations {
        let base = ToolAnnotations { open_world_hint: Some(true), ..Default::default() };
        match self {
            SideEffect::ReadOnly => ToolAnnotations {
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
                ..base
            },
            SideEffect::CreateOrUpdate => ToolAnnotations {
                read_only_hint: Some(false),
                destructive_hint: Some(false),
                ..base
            },
            SideEffect::Destructive => ToolAnnotations {
                read_only_hint: Some(false),
                destructive_hint: Some(true),
                ..base
            },
        }
    }
}

/// One registered tool.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub tag: &'static str,
    pub side_effect: SideEffect,
    pub description: &'static str,
    pub input_schema: Value,
    pub executor: ToolExecutor,
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("side_effect", &self.side_effect)
            .finish_non_exhaustive()
    }
}

impl ToolDescriptor {
    pub fn new(
        name: &'static str,
        tag: &'static str,
        side_effect: SideEffect,
        description: &'static str,
        input_schema: Value,
        executor: ToolExecutor,
    ) -> Self {
        Self { name, tag, side_effect, description, input_schema, executor }
    }

    /// Protocol definition advertised by `tools/list`.
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(self.name, self.description, self.input_schema.clone());
        tool.annotations = Some(self.side_effect.annotations());
        tool.meta = Some(json!({ "tags": [self.tag] }));
        tool
    }

    pub async fn execute(&self, ctx: &SessionContext, args: Value) -> Result<Value, McpError> {
        (self.executor)(ctx, args).await
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate registration: {0}")]
    Duplicate(String),
}

/// Ordered, name-indexed set of tools.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Registry with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the full tool set, grouped by domain in registration order.
    pub fn with_all_tools() -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        let groups = [
            tools::audit::descriptors(),
            tools::auth::descriptors(),
            tools::kv2::descriptors(),
            tools::pki::descriptors(),
            tools::database::descriptors(),
            tools::policy::descriptors(),
            tools::secret_engine::descriptors(),
            tools::transit::descriptors(),
        ];
        for descriptor in groups.into_iter().flatten() {
            registry.register(descriptor)?;
        }

        tracing::debug!(tools = registry.len(), "Tool registry built");
        Ok(registry)
    }

    /// Add a tool; names must be unique.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        if self.index.contains_key(descriptor.name) {
            return Err(RegistryError::Duplicate(descriptor.name.to_string()));
        }
        self.index.insert(descriptor.name, self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    /// Definitions in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_tool).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
