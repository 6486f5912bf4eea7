//! MCP Prompts Module
//!
//! Templated prompts for writing Vault ACL policies.

pub mod registry;
pub mod templates;

use crate::mcp::error::McpError;
use crate::mcp::protocol::{Prompt, PromptGetResult};
use registry::PromptRegistry;
use serde_json::Value;
use std::sync::OnceLock;

static PROMPT_REGISTRY: OnceLock<PromptRegistry> = OnceLock::new();

/// Initialize and return the global prompt registry
fn get_registry() -> &'static PromptRegistry {
    PROMPT_REGISTRY.get_or_init(|| {
        let mut registry = PromptRegistry::new();

        registry.register(
            "example-acl-policy",
            "Show an example Vault ACL policy to start from",
            None,
            templates::render_example_policy,
        );

        registry.register(
            "generate-acl-policy",
            "Generate a Vault ACL policy granting capabilities on a list of paths",
            Some(templates::generate_policy_arguments()),
            templates::render_generate_policy,
        );

        registry
    })
}

/// Get all available prompts
pub fn get_all_prompts() -> Vec<Prompt> {
    get_registry().list_all()
}

/// Get a specific prompt by name and render it with arguments
///
/// Fails with [`McpError::PromptNotFound`] for unknown names and
/// [`McpError::InvalidParams`] when required arguments are missing.
pub fn get_prompt(name: &str, arguments: Option<Value>) -> Result<PromptGetResult, McpError> {
    get_registry().render(name, arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_all_prompts() {
        let names: Vec<String> = get_all_prompts().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["example-acl-policy", "generate-acl-policy"]);
    }

    #[test]
    fn test_get_prompt_generate() {
        let prompt = get_prompt("generate-acl-policy", Some(json!({"paths": ["secret/data/x"]})))
            .expect("rendered");
        assert!(prompt.description.is_some());
        assert_eq!(prompt.messages.len(), 1);
    }

    #[test]
    fn test_get_prompt_not_found() {
        let result = get_prompt("unknown_prompt", None);
        match result {
            Err(McpError::PromptNotFound(msg)) => assert!(msg.contains("unknown_prompt")),
            other => panic!("Expected PromptNotFound, got {:?}", other.map(|r| r.description)),
        }
    }

    #[test]
    fn test_prompts_have_descriptions() {
        for prompt in get_all_prompts() {
            assert!(prompt.description.is_some(), "Prompt '{}' should have a description", prompt.name);
        }
    }
}
