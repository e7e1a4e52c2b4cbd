//! Shared HTTP plumbing for the backend adapters.
//!
//! Every adapter POSTs a JSON body to one endpoint and reads a JSON body
//! back. `HttpBackend` owns the pooled `reqwest::Client`, the resolved API
//! base, and the auth headers, and maps transport/status failures onto
//! `BackendError`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error};

use decoy_core::config::ProviderConfig;
use decoy_core::{BackendError, LlmError};

use crate::registry::ProviderSpec;

// ─────────────────────────────────────────────
// HttpBackend
// ─────────────────────────────────────────────

/// Connection settings for one backend: client, base URL, default headers.
pub struct HttpBackend {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL without trailing slash (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// Reference to the provider spec, for logging.
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("api_base", &self.api_base)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpBackend {
    /// Build the client for `spec`.
    ///
    /// # Arguments
    /// * `config`   — user config (timeout)
    /// * `spec`     — static provider spec from the registry
    /// * `api_base` — already-resolved base URL
    /// * `headers`  — auth and version headers sent on every request
    pub fn new(
        config: &ProviderConfig,
        spec: &'static ProviderSpec,
        api_base: &str,
        headers: HeaderMap,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| init_error(spec, format!("failed to build HTTP client: {e}")))?;

        Ok(HttpBackend {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            spec,
        })
    }

    /// Resolved API base.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Join a path onto the API base.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// POST `body` to `path` and return the decoded JSON reply.
    ///
    /// An empty or literal `null` reply is `Ok(None)`.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Option<serde_json::Value>, BackendError> {
        let url = self.url(path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.spec.display_name, error = %e, "HTTP request failed");
                BackendError::transport(e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(BackendError::transport)?;

        if !status.is_success() {
            error!(
                provider = self.spec.display_name,
                status = %status,
                body = %decoy_core::utils::truncate_string(&text, 500),
                "API error"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "null" {
            debug!(provider = self.spec.display_name, "empty response body");
            return Ok(None);
        }

        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

// ─────────────────────────────────────────────
// Helpers shared by the initializers
// ─────────────────────────────────────────────

/// Build a `ProviderInitialization` error for `spec`.
pub fn init_error(spec: &ProviderSpec, message: impl Into<String>) -> LlmError {
    LlmError::ProviderInitialization {
        provider: spec.name,
        message: message.into(),
    }
}

/// Resolve the API base: config > spec default.
pub fn resolve_api_base(config: &ProviderConfig, spec: &ProviderSpec) -> Result<String, LlmError> {
    config
        .server_url
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(spec.default_api_base)
        .map(String::from)
        .ok_or_else(|| init_error(spec, "no endpoint configured (set serverUrl)"))
}

/// Header map from `(name, value)` pairs, rejecting credentials that are
/// not valid header values.
pub fn header_map(
    spec: &ProviderSpec,
    entries: &[(&'static str, String)],
) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    for (name, value) in entries {
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| init_error(spec, format!("invalid characters in {name} header")))?;
        if name.eq_ignore_ascii_case("authorization") || name.contains("key") {
            value.set_sensitive(true);
        }
        headers.insert(HeaderName::from_static(*name), value);
    }
    Ok(headers)
}

/// `Authorization: Bearer <token>` header map.
pub fn bearer_headers(spec: &ProviderSpec, token: &str) -> Result<HeaderMap, LlmError> {
    header_map(spec, &[("authorization", format!("Bearer {token}"))])
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
