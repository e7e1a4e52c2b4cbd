//! Gemini `generateContent` adapter, reached either through Google AI
//! Studio (API key) or Vertex AI (project, location, bearer token).
//!
//! Both front-ends share one wire format; only the URL layout and the auth
//! header differ.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use decoy_core::config::ProviderConfig;
use decoy_core::{BackendError, Choice, Completion, GenerateOptions, LlmError, Message, Role};

use crate::http_provider::{bearer_headers, header_map, init_error, resolve_api_base, HttpBackend};
use crate::registry::{ProviderKind, ProviderSpec};
use crate::traits::ModelClient;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

// ─────────────────────────────────────────────
// GeminiClient
// ─────────────────────────────────────────────

/// Client for Gemini models on Google AI or Vertex AI.
#[derive(Debug)]
pub struct GeminiClient {
    http: HttpBackend,
    kind: ProviderKind,
    model: String,
    /// Path of the `generateContent` method relative to the API base.
    method_path: String,
}

impl GeminiClient {
    /// Google AI Studio: `x-goog-api-key` auth, `v1beta/models/{model}`.
    pub fn google_ai(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, LlmError> {
        let api_base = resolve_api_base(config, spec)?;
        let headers = header_map(spec, &[("x-goog-api-key", config.api_key.clone())])?;
        Ok(GeminiClient {
            http: HttpBackend::new(config, spec, &api_base, headers)?,
            kind: ProviderKind::GoogleAi,
            model: config.model.clone(),
            method_path: format!("v1beta/models/{}:generateContent", config.model),
        })
    }

    /// Vertex AI: bearer access token, regional endpoint derived from
    /// `cloud_location` unless `server_url` overrides it.
    pub fn vertex(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, LlmError> {
        let project = non_blank(config.cloud_project.as_deref())
            .ok_or_else(|| init_error(spec, "cloudProject is required"))?;
        let location = non_blank(config.cloud_location.as_deref())
            .ok_or_else(|| init_error(spec, "cloudLocation is required"))?;

        let api_base = match non_blank(config.server_url.as_deref()) {
            Some(url) => url.to_string(),
            None => vertex_endpoint(location),
        };
        let headers = bearer_headers(spec, &config.api_key)?;

        Ok(GeminiClient {
            http: HttpBackend::new(config, spec, &api_base, headers)?,
            kind: ProviderKind::Vertex,
            model: config.model.clone(),
            method_path: format!(
                "projects/{project}/locations/{location}/publishers/google/models/{}:generateContent",
                config.model
            ),
        })
    }

    /// Gemini has no system role here; system text, if any arrives, is
    /// passed as `systemInstruction`.
    fn build_request_body(&self, messages: &[Message], options: &GenerateOptions) -> serde_json::Value {
        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role == Role::Human)
            .map(|m| json!({ "role": "user", "parts": [{ "text": m.text }] }))
            .collect();

        let mut generation_config = json!({ "temperature": options.temperature });
        if options.json_mode {
            generation_config["responseMimeType"] = json!("application/json");
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });

        let system: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| json!({ "text": m.text }))
            .collect();
        if !system.is_empty() {
            body["systemInstruction"] = json!({ "parts": system });
        }
        body
    }
}

/// Regional Vertex AI endpoint.
pub fn vertex_endpoint(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com/v1")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_response(value: serde_json::Value) -> Result<Completion, BackendError> {
    let resp: GenerateContentResponse =
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))?;

    let choices = resp
        .candidates
        .into_iter()
        .map(|candidate| {
            let content = candidate
                .content
                .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
                .unwrap_or_default();
            Choice {
                content,
                finish_reason: candidate.finish_reason,
            }
        })
        .collect();
    Ok(Completion { choices })
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate_content(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Option<Completion>, BackendError> {
        debug!(
            provider = self.kind.name(),
            model = %self.model,
            messages = messages.len(),
            "Calling Gemini"
        );
        let body = self.build_request_body(messages, options);
        match self.http.post_json(&self.method_path, &body).await? {
            Some(value) => parse_response(value).map(Some),
            None => Ok(None),
        }
    }

    fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
