//! OpenAI chat completions adapter.
//!
//! Also works against OpenAI-compatible servers (vLLM, LiteLLM proxies)
//! through `serverUrl`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use decoy_core::config::ProviderConfig;
use decoy_core::{BackendError, Choice, Completion, GenerateOptions, LlmError, Message, Role};

use crate::http_provider::{bearer_headers, resolve_api_base, HttpBackend};
use crate::registry::{ProviderKind, ProviderSpec};
use crate::traits::ModelClient;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

// ─────────────────────────────────────────────
// OpenAiClient
// ─────────────────────────────────────────────

/// Client for `POST {base}/chat/completions`.
#[derive(Debug)]
pub struct OpenAiClient {
    http: HttpBackend,
    model: String,
}

impl OpenAiClient {
    /// Create a client; `config.api_key` is sent as a Bearer token.
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, LlmError> {
        let api_base = resolve_api_base(config, spec)?;
        let headers = bearer_headers(spec, &config.api_key)?;
        Ok(OpenAiClient {
            http: HttpBackend::new(config, spec, &api_base, headers)?,
            model: config.model.clone(),
        })
    }

    fn build_request_body(&self, messages: &[Message], options: &GenerateOptions) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| json!({ "role": openai_role(m.role), "content": m.text }))
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
        });
        if options.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

fn openai_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Human => "user",
    }
}

fn parse_response(value: serde_json::Value) -> Result<Completion, BackendError> {
    let resp: ChatCompletionResponse =
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))?;

    let choices = resp
        .choices
        .into_iter()
        .map(|c| Choice {
            content: c.message.content.unwrap_or_default(),
            finish_reason: c.finish_reason,
        })
        .collect();
    Ok(Completion { choices })
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn generate_content(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Option<Completion>, BackendError> {
        debug!(model = %self.model, messages = messages.len(), "Calling OpenAI");
        let body = self.build_request_body(messages, options);
        match self.http.post_json("chat/completions", &body).await? {
            Some(value) => parse_response(value).map(Some),
            None => Ok(None),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
