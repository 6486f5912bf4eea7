//! Error types for Vault client operations.

use thiserror::Error;
use vaultrs::error::ClientError;

/// Result type for Vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Errors raised while constructing the client or calling the Vault HTTP API.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Malformed URL or token; raised before any network call.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The token was rejected by the server.
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// The server is sealed, uninitialized or otherwise not serving requests.
    #[error("Vault unavailable: {message}")]
    Unavailable { message: String },

    /// Vault answered with a non-success status.
    #[error("Vault request failed with status {status}: {}", .errors.join("; "))]
    RemoteOperation { status: u16, errors: Vec<String> },

    /// The request never produced a response.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },
}

impl VaultError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication { message: message.into() }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }

    /// Create a remote operation error from a status code and Vault's `errors` array.
    pub fn remote(status: u16, errors: Vec<String>) -> Self {
        Self::RemoteOperation { status, errors }
    }

    /// Create an unexpected response error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse { message: message.into() }
    }

    /// True when Vault reported that the requested path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RemoteOperation { status: 404, .. })
    }

    /// Error detail suitable for a `{success: false, error}` result.
    pub fn detail(&self) -> String {
        match self {
            Self::RemoteOperation { errors, status } if errors.is_empty() => {
                format!("status {}", status)
            }
            Self::RemoteOperation { errors, .. } => errors.join("; "),
            other => other.to_string(),
        }
    }
}

impl From<ClientError> for VaultError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::APIError { code, errors } => Self::RemoteOperation { status: code, errors },
            ClientError::RestClientError { source } => Self::Transport { message: source.to_string() },
            other => Self::UnexpectedResponse { message: other.to_string() },
        }
    }
}

impl From<reqwest::Error> for VaultError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport { message: error.to_string() }
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(error: serde_json::Error) -> Self {
        Self::UnexpectedResponse { message: error.to_string() }
    }
}
