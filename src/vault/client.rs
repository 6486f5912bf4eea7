//! Authenticated Vault HTTP client and the factory that builds it.
//!
//! [`construct_client`] resolves the server URL and token (explicit argument,
//! then environment, then default), validates both before any network I/O,
//! and then verifies that the token is accepted and that the server is
//! unsealed. The resulting [`VaultClient`] wraps a `vaultrs` client for the
//! typed engine APIs; the raw verbs cover endpoints `vaultrs` does not wrap
//! and return the decoded JSON envelope of each response.
//!
//! # Environment
//!
//! - `VAULT_URL`: server address (default `http://127.0.0.1:8200`)
//! - `VAULT_TOKEN`: access token, required
//! - `VAULT_NAMESPACE`: optional enterprise namespace
//! - `VAULT_TIMEOUT_SECS`: request timeout (default 30)

use regex::Regex;
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use url::Url;
use vaultrs::client::VaultClientSettingsBuilder;
use vaultrs::sys::ServerStatus;

use super::error::{Result, VaultError};

/// Address used when neither an override nor `VAULT_URL` is present.
pub const DEFAULT_VAULT_URL: &str = "http://127.0.0.1:8200";

pub const VAULT_URL_ENV: &str = "VAULT_URL";
pub const VAULT_TOKEN_ENV: &str = "VAULT_TOKEN";
pub const VAULT_NAMESPACE_ENV: &str = "VAULT_NAMESPACE";
pub const VAULT_TIMEOUT_ENV: &str = "VAULT_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.]+$").expect("TOKEN_PATTERN should be a valid regex pattern")
});

// ============================================================================
// Settings
// ============================================================================

/// Connection settings for the Vault server.
///
/// Fields left as `None` are resolved from the environment when the client
/// is constructed.
#[derive(Debug, Clone, Default)]
pub struct VaultSettings {
    pub url: Option<String>,
    pub token: Option<String>,
    pub namespace: Option<String>,
    pub timeout: Option<Duration>,
}

impl VaultSettings {
    /// Settings with explicit URL and token overrides.
    pub fn with_overrides(url: Option<String>, token: Option<String>) -> Self {
        Self { url, token, ..Default::default() }
    }

    /// Resolve the server URL: explicit value, then `VAULT_URL`, then the default.
    pub fn resolve_url(&self) -> String {
        self.url
            .clone()
            .or_else(|| std::env::var(VAULT_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_VAULT_URL.to_string())
    }

    /// Resolve the token: explicit value, then `VAULT_TOKEN`. There is no default.
    pub fn resolve_token(&self) -> String {
        self.token.clone().or_else(|| std::env::var(VAULT_TOKEN_ENV).ok()).unwrap_or_default()
    }

    fn resolve_namespace(&self) -> Option<String> {
        self.namespace
            .clone()
            .or_else(|| std::env::var(VAULT_NAMESPACE_ENV).ok())
            .filter(|ns| !ns.trim().is_empty())
    }

    fn resolve_timeout(&self) -> Duration {
        self.timeout.unwrap_or_else(|| {
            std::env::var(VAULT_TIMEOUT_ENV)
                .ok()
                .and_then(|secs| secs.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        })
    }
}

/// Parse and check that a URL carries both a scheme and a host.
pub fn validate_url(raw: &str) -> Result<Url> {
    let parsed = Url::parse(raw)
        .map_err(|e| VaultError::configuration(format!("invalid vault url '{}': {}", raw, e)))?;

    if parsed.scheme().is_empty() || parsed.host_str().unwrap_or_default().is_empty() {
        return Err(VaultError::configuration(format!(
            "invalid vault url '{}': scheme and host are required",
            raw
        )));
    }

    Ok(parsed)
}

/// Check that a token only contains ASCII letters, digits and periods.
pub fn validate_token(token: &str) -> Result<()> {
    if TOKEN_PATTERN.is_match(token) {
        Ok(())
    } else {
        Err(VaultError::configuration("invalid token format"))
    }
}

// ============================================================================
// Client factory
// ============================================================================

/// Build an authenticated client from optional overrides and the environment.
pub async fn construct_client(
    url_override: Option<&str>,
    token_override: Option<&str>,
) -> Result<VaultClient> {
    let settings = VaultSettings::with_overrides(
        url_override.map(str::to_string),
        token_override.map(str::to_string),
    );
    construct_client_from(&settings).await
}

/// Validate settings, then confirm the token is accepted and the server is unsealed.
pub async fn construct_client_from(settings: &VaultSettings) -> Result<VaultClient> {
    let client = VaultClient::new(settings)?;

    client.check_authenticated().await?;
    client.check_unsealed().await?;

    tracing::info!(
        address = %client.address,
        namespace = ?client.api.settings.namespace,
        "Vault client authenticated"
    );

    Ok(client)
}

/// Authenticated handle to a Vault server.
///
/// Typed operations go through the wrapped `vaultrs` client. Endpoints it has
/// no wrapper for are sent with a plain HTTP client that reuses the same
/// address, token and namespace.
#[derive(Clone)]
pub struct VaultClient {
    api: Arc<vaultrs::client::VaultClient>,
    http: reqwest::Client,
    address: Url,
}

impl fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultClient")
            .field("address", &self.address.as_str())
            .field("namespace", &self.api.settings.namespace)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Validate settings and build the client without contacting the server.
    pub fn new(settings: &VaultSettings) -> Result<Self> {
        let address = validate_url(&settings.resolve_url())?;
        let token = settings.resolve_token();
        validate_token(&token)?;
        let timeout = settings.resolve_timeout();

        let mut builder = VaultClientSettingsBuilder::default();
        builder.address(address.as_str());
        builder.token(&token);
        builder.namespace(settings.resolve_namespace());
        builder.timeout(Some(timeout));

        let api_settings = builder.build().map_err(|e| {
            VaultError::configuration(format!("Invalid Vault configuration: {}", e))
        })?;
        let api = vaultrs::client::VaultClient::new(api_settings).map_err(|e| {
            VaultError::configuration(format!("Failed to create Vault client: {}", e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { api: Arc::new(api), http, address })
    }

    /// Base address of the server.
    pub fn address(&self) -> &Url {
        &self.address
    }

    /// The `vaultrs` client used for typed operations.
    pub fn api(&self) -> &vaultrs::client::VaultClient {
        &self.api
    }

    async fn check_authenticated(&self) -> Result<()> {
        match vaultrs::token::lookup_self(self.api()).await.map_err(VaultError::from) {
            Ok(_) => Ok(()),
            Err(VaultError::RemoteOperation { status, errors })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                tracing::error!(address = %self.address, status, "Vault rejected the token");
                Err(VaultError::authentication(if errors.is_empty() {
                    "token was rejected".to_string()
                } else {
                    errors.join("; ")
                }))
            }
            Err(VaultError::RemoteOperation { status, errors })
                if status == StatusCode::SERVICE_UNAVAILABLE.as_u16() =>
            {
                Err(VaultError::unavailable(errors.join("; ")))
            }
            Err(e) => Err(e),
        }
    }

    async fn check_unsealed(&self) -> Result<()> {
        let message = match vaultrs::sys::status(self.api()).await? {
            ServerStatus::OK | ServerStatus::STANDBY | ServerStatus::PERFSTANDBY => return Ok(()),
            ServerStatus::SEALED => "Vault is sealed",
            ServerStatus::UNINITIALIZED => "Vault is not initialized",
            ServerStatus::RECOVERY => "Vault is in recovery mode",
            ServerStatus::UNKNOWN => "Vault health status could not be determined",
        };
        tracing::error!(address = %self.address, "{}", message);
        Err(VaultError::unavailable(message))
    }

    // ------------------------------------------------------------------------
    // Raw HTTP verbs, for endpoints without a vaultrs wrapper
    // ------------------------------------------------------------------------

    /// `GET /v1/{path}`. Returns `None` for an empty (204) response.
    pub async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.send(Method::GET, path, &[], None::<&Value>).await
    }

    /// `GET /v1/{path}` with query parameters.
    pub async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Option<Value>> {
        self.send(Method::GET, path, query, None::<&Value>).await
    }

    /// `GET /v1/{path}` returning the raw body, for PEM and other text endpoints.
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let response = self.request(Method::GET, path, &[]).send().await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }

    /// List keys under a path (`GET /v1/{path}?list=true`).
    pub async fn list(&self, path: &str) -> Result<Option<Value>> {
        self.send(Method::GET, path, &[("list", "true".to_string())], None::<&Value>).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Option<Value>> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Option<Value>> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Option<Value>> {
        self.send(Method::DELETE, path, &[], None::<&Value>).await
    }

    /// `PATCH /v1/{path}` with a JSON merge patch body.
    pub async fn merge_patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>> {
        let payload = serde_json::to_vec(body)?;
        let response = self
            .request(Method::PATCH, path, &[])
            .header(reqwest::header::CONTENT_TYPE, "application/merge-patch+json")
            .body(payload)
            .send()
            .await?;
        decode(response).await
    }

    fn request(&self, method: Method, path: &str, query: &[(&str, String)]) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/v1/{}",
            self.address.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        tracing::debug!(method = %method, path = %path, "Vault request");

        let settings = &self.api.settings;
        let mut builder = self.http.request(method, url).header(TOKEN_HEADER, &settings.token);
        if let Some(namespace) = &settings.namespace {
            builder = builder.header(NAMESPACE_HEADER, namespace);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Option<Value>> {
        let mut builder = self.request(method, path, query);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        decode(builder.send().await?).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let errors = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.errors)
        .unwrap_or_else(|_| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        });

    tracing::debug!(status = status.as_u16(), errors = ?errors, "Vault request failed");
    Err(VaultError::remote(status.as_u16(), errors))
}

async fn decode(response: Response) -> Result<Option<Value>> {
    let response = check_status(response).await?;
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}
