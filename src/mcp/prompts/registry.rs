//! Prompt Registry
//!
//! Lookup table for MCP prompts, listed in registration order.

use crate::mcp::error::McpError;
use crate::mcp::protocol::{Prompt, PromptArgument, PromptGetResult};
use serde_json::Value;
use std::collections::HashMap;

/// Type alias for prompt rendering function
pub type PromptRenderer = fn(Option<Value>) -> Result<PromptGetResult, McpError>;

/// Prompt entry in the registry
pub struct PromptEntry {
    pub definition: Prompt,
    pub renderer: PromptRenderer,
}

/// Registry for managing prompts
#[derive(Default)]
pub struct PromptRegistry {
    entries: Vec<PromptEntry>,
    index: HashMap<String, usize>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prompt with its renderer. A later registration under the
    /// same name replaces the earlier one.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        arguments: Option<Vec<PromptArgument>>,
        renderer: PromptRenderer,
    ) {
        let definition = Prompt {
            name: name.to_string(),
            description: Some(description.to_string()),
            arguments,
        };
        let entry = PromptEntry { definition, renderer };

        match self.index.get(name) {
            Some(&position) => self.entries[position] = entry,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PromptEntry> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    pub fn list_all(&self) -> Vec<Prompt> {
        self.entries.iter().map(|entry| entry.definition.clone()).collect()
    }

    /// Render a prompt with arguments
    pub fn render(&self, name: &str, arguments: Option<Value>) -> Result<PromptGetResult, McpError> {
        let entry = self
            .get(name)
            .ok_or_else(|| McpError::PromptNotFound(format!("Prompt not found: {}", name)))?;

        (entry.renderer)(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{PromptContent, PromptMessage};

    fn test_renderer(_args: Option<Value>) -> Result<PromptGetResult, McpError> {
        Ok(PromptGetResult {
            messages: vec![PromptMessage::User {
                content: PromptContent::Text { text: "Test prompt".to_string() },
            }],
            description: Some("Test description".to_string()),
        })
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = PromptRegistry::new();
        registry.register("test-prompt", "A test prompt", None, test_renderer);

        let entry = registry.get("test-prompt").expect("registered");
        assert_eq!(entry.definition.name, "test-prompt");
        assert_eq!(entry.definition.description.as_deref(), Some("A test prompt"));
    }

    #[test]
    fn test_registry_keeps_registration_order() {
        let mut registry = PromptRegistry::new();
        registry.register("zeta", "z", None, test_renderer);
        registry.register("alpha", "a", None, test_renderer);
        registry.register("zeta", "z2", None, test_renderer);

        let names: Vec<_> = registry.list_all().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(registry.get("zeta").and_then(|e| e.definition.description.clone()).as_deref(), Some("z2"));
    }

    #[test]
    fn test_registry_render_missing() {
        let registry = PromptRegistry::new();
        let result = registry.render("missing", None);
        assert!(matches!(result, Err(McpError::PromptNotFound(_))));
    }
}
