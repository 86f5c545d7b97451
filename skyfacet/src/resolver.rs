use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ResolverSettings;

/// Default identity service used when nothing else is configured
pub const DEFAULT_SERVICE_URL: &str = "https://bsky.social";

const RESOLVE_HANDLE_PATH: &str = "/xrpc/com.atproto.identity.resolveHandle";

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Turns a handle (without its leading `@`) into a stable account identifier.
///
/// Implementations report failures as-is; retrying is up to the caller.
#[async_trait]
pub trait HandleResolver: Send + Sync {
    async fn resolve_handle(&self, handle: &str) -> ResolveResult<String>;
}

#[derive(Debug, Deserialize)]
struct ResolveHandleOutput {
    did: String,
}

#[derive(Debug, Deserialize)]
struct XrpcErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Resolves handles through an XRPC identity service
#[derive(Debug, Clone)]
pub struct XrpcResolver {
    client: Client,
    base_url: String,
}

impl XrpcResolver {
    /// Create a resolver for the given service URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a resolver with the transport settings from configuration
    pub fn from_settings(settings: &ResolverSettings) -> ResolveResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.service_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve_url(&self, handle: &str) -> String {
        format!(
            "{}{}?handle={}",
            self.base_url,
            RESOLVE_HANDLE_PATH,
            urlencoding::encode(handle)
        )
    }

    /// Helper to handle XRPC responses
    async fn handle_response(&self, response: reqwest::Response) -> ResolveResult<String> {
        let status = response.status();

        if status.is_success() {
            let output: ResolveHandleOutput = response.json().await?;
            return Ok(output.did);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let clean_error = clean_error_text(status, &error_text);

        match status.as_u16() {
            404 => Err(ResolveError::NotFound(clean_error)),
            400 => Err(ResolveError::BadRequest(clean_error)),
            _ => Err(ResolveError::Api(clean_error)),
        }
    }
}

impl Default for XrpcResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_URL)
    }
}

#[async_trait]
impl HandleResolver for XrpcResolver {
    async fn resolve_handle(&self, handle: &str) -> ResolveResult<String> {
        let url = self.resolve_url(handle);
        tracing::debug!("Resolving handle {} via {}", handle, self.base_url);

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }
}

/// Condense an error body into a single line: XRPC `{error, message}` bodies keep their
/// message, HTML error pages are replaced by the status code
fn clean_error_text(status: reqwest::StatusCode, body: &str) -> String {
    if body.contains("<html>") || body.contains("<!DOCTYPE") {
        return format!("Server returned {} error", status.as_u16());
    }

    match serde_json::from_str::<XrpcErrorBody>(body) {
        Ok(XrpcErrorBody {
            error: Some(error),
            message: Some(message),
        }) => format!("{}: {}", error, message),
        Ok(XrpcErrorBody {
            error: None,
            message: Some(message),
        }) => message,
        Ok(XrpcErrorBody {
            error: Some(error),
            message: None,
        }) => error,
        _ if body.trim().is_empty() => format!("Server returned {} error", status.as_u16()),
        _ => body.trim().to_string(),
    }
}
