//! # Error Handling
//!
//! Application-level error type. Library layers keep their own enums
//! ([`VaultError`], [`McpError`]) and are wrapped here at the process edge.

use crate::mcp::error::McpError;
use crate::mcp::registry::RegistryError;
use crate::vault::VaultError;

/// Custom result type for server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the server process
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration values outside their allowed range
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Network transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_errors_pass_through() {
        let err: Error = VaultError::authentication("permission denied").into();
        assert_eq!(err.to_string(), "Authentication error: permission denied");
    }

    #[test]
    fn test_constructors() {
        assert!(matches!(Error::config("bad"), Error::Config(m) if m == "bad"));
        assert!(matches!(Error::validation("port"), Error::Validation(_)));
    }
}
