//! Built-in Prompt Templates
//!
//! ACL policy prompts. Pure text rendering; nothing here talks to Vault.

use crate::mcp::error::McpError;
use crate::mcp::protocol::{PromptArgument, PromptContent, PromptGetResult, PromptMessage};
use serde_json::Value;

/// Capabilities granted by `generate-acl-policy` when none are requested.
pub const DEFAULT_CAPABILITIES: &[&str] = &["read", "list"];

const EXAMPLE_POLICY: &str = r#"# Read-only access to application secrets in the KV v2 engine
path "secret/data/myapp/*" {
  capabilities = ["read", "list"]
}

path "secret/metadata/myapp/*" {
  capabilities = ["list"]
}

# Encrypt and decrypt with a single transit key
path "transit/encrypt/myapp" {
  capabilities = ["update"]
}

path "transit/decrypt/myapp" {
  capabilities = ["update"]
}

# Issue certificates from the web role
path "pki/issue/web" {
  capabilities = ["create", "update"]
}

# Deny everything under the admin prefix
path "secret/data/admin/*" {
  capabilities = ["deny"]
}"#;

/// Parse a list argument given either as a JSON array of strings or as a
/// comma-separated string (which may itself hold a JSON array).
fn parse_list(args: &Option<Value>, name: &str) -> Result<Option<Vec<String>>, McpError> {
    let value = match args.as_ref().and_then(|v| v.get(name)) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let items: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    McpError::InvalidParams(format!("Argument '{}' must contain only strings", name))
                })
            })
            .collect::<Result<_, _>>()?,
        Value::String(text) if text.trim_start().starts_with('[') => serde_json::from_str(text)
            .map_err(|e| McpError::InvalidParams(format!("Argument '{}' is not a JSON array: {}", name, e)))?,
        Value::String(text) => text.split(',').map(|item| item.trim().to_string()).collect(),
        _ => {
            return Err(McpError::InvalidParams(format!(
                "Argument '{}' must be a string or an array of strings",
                name
            )))
        }
    };

    Ok(Some(items.into_iter().filter(|item| !item.is_empty()).collect()))
}

/// Render an HCL policy granting `capabilities` on every path.
pub fn render_policy(paths: &[String], capabilities: &[String]) -> String {
    let quoted: Vec<String> = capabilities.iter().map(|c| format!("\"{}\"", c)).collect();
    let capabilities = quoted.join(", ");

    paths
        .iter()
        .map(|path| format!("path \"{}\" {{\n  capabilities = [{}]\n}}", path, capabilities))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn user_message(text: String) -> Vec<PromptMessage> {
    vec![PromptMessage::User { content: PromptContent::Text { text } }]
}

// -----------------------------------------------------------------------------
// example-acl-policy
// -----------------------------------------------------------------------------

pub fn render_example_policy(_args: Option<Value>) -> Result<PromptGetResult, McpError> {
    let text = format!(
        "Here is an example Vault ACL policy. Each `path` stanza grants capabilities \
         (create, read, update, patch, delete, list, sudo, deny) on a path, and globs \
         are allowed at the end of a path. Use it as a starting point and store the result \
         with the `policy-create-or-update` tool.\n\n```hcl\n{}\n```",
        EXAMPLE_POLICY
    );

    Ok(PromptGetResult {
        description: Some("Example Vault ACL policy".to_string()),
        messages: user_message(text),
    })
}

// -----------------------------------------------------------------------------
// generate-acl-policy
// -----------------------------------------------------------------------------

pub fn generate_policy_arguments() -> Vec<PromptArgument> {
    vec![
        PromptArgument {
            name: "paths".to_string(),
            description: Some("Comma-separated list or JSON array of Vault paths".to_string()),
            required: Some(true),
        },
        PromptArgument {
            name: "capabilities".to_string(),
            description: Some("Capabilities to grant on every path; defaults to read, list".to_string()),
            required: Some(false),
        },
    ]
}

pub fn render_generate_policy(args: Option<Value>) -> Result<PromptGetResult, McpError> {
    let paths = parse_list(&args, "paths")?
        .filter(|paths| !paths.is_empty())
        .ok_or_else(|| McpError::InvalidParams("Missing required argument: paths".to_string()))?;
    let capabilities = parse_list(&args, "capabilities")?
        .filter(|capabilities| !capabilities.is_empty())
        .unwrap_or_else(|| DEFAULT_CAPABILITIES.iter().map(|c| c.to_string()).collect());

    let policy = render_policy(&paths, &capabilities);
    let text = format!(
        "Review the following Vault ACL policy granting [{}] on {} path(s). If it matches \
         the intended access, store it with the `policy-create-or-update` tool.\n\n```hcl\n{}\n```",
        capabilities.join(", "),
        paths.len(),
        policy
    );

    Ok(PromptGetResult {
        description: Some(format!("ACL policy for {}", paths.join(", "))),
        messages: user_message(text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_of(result: &PromptGetResult) -> &str {
        match &result.messages[0] {
            PromptMessage::User { content: PromptContent::Text { text } } => text,
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_render_policy() {
        let policy = render_policy(
            &["secret/data/a".to_string(), "secret/data/b/*".to_string()],
            &["read".to_string()],
        );
        assert_eq!(
            policy,
            "path \"secret/data/a\" {\n  capabilities = [\"read\"]\n}\n\npath \"secret/data/b/*\" {\n  capabilities = [\"read\"]\n}"
        );
    }

    #[test]
    fn test_generate_from_comma_separated_paths() {
        let result = render_generate_policy(Some(json!({"paths": "secret/data/a, transit/encrypt/k"})))
            .expect("rendered");
        let text = text_of(&result);
        assert!(text.contains("path \"secret/data/a\""));
        assert!(text.contains("path \"transit/encrypt/k\""));
        assert!(text.contains("capabilities = [\"read\", \"list\"]"));
    }

    #[test]
    fn test_generate_from_json_array_string() {
        let result = render_generate_policy(Some(json!({
            "paths": "[\"pki/issue/web\"]",
            "capabilities": ["create", "update"],
        })))
        .expect("rendered");
        assert!(text_of(&result).contains("path \"pki/issue/web\" {\n  capabilities = [\"create\", \"update\"]\n}"));
    }

    #[test]
    fn test_generate_requires_paths() {
        let err = render_generate_policy(Some(json!({"paths": " , "}))).expect_err("no paths");
        assert!(err.to_string().contains("paths"));
        assert!(render_generate_policy(None).is_err());
    }

    #[test]
    fn test_example_policy_is_hcl() {
        let result = render_example_policy(None).expect("rendered");
        assert!(text_of(&result).contains("```hcl\npath \"secret/data/myapp/*\""));
    }
}
