//! MCP (Model Context Protocol) Server Implementation
//!
//! Exposes Vault operations to AI agents as tools, resources and prompts over
//! a stdio or streamable HTTP transport.

pub mod cache;
pub mod error;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod server;
pub mod tools;

pub use cache::ResponseCache;
pub use error::McpError;
pub use handler::McpHandler;
pub use lifecycle::SessionLifecycle;
pub use protocol::*;
pub use registry::{RegistryError, SideEffect, ToolDescriptor, ToolRegistry};
pub use resources::{ResourceDescriptor, ResourceRegistry};
pub use server::McpStdioServer;
