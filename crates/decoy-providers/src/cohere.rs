//! Cohere Chat API (v2) adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use decoy_core::config::ProviderConfig;
use decoy_core::{BackendError, Choice, Completion, GenerateOptions, LlmError, Message, Role};

use crate::http_provider::{bearer_headers, resolve_api_base, HttpBackend};
use crate::registry::{ProviderKind, ProviderSpec};
use crate::traits::ModelClient;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Client for `POST {base}/v2/chat`.
#[derive(Debug)]
pub struct CohereClient {
    http: HttpBackend,
    model: String,
}

impl CohereClient {
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, LlmError> {
        let api_base = resolve_api_base(config, spec)?;
        let headers = bearer_headers(spec, &config.api_key)?;
        Ok(CohereClient {
            http: HttpBackend::new(config, spec, &api_base, headers)?,
            model: config.model.clone(),
        })
    }

    fn build_request_body(&self, messages: &[Message], options: &GenerateOptions) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => "system",
                    Role::Human => "user",
                };
                json!({ "role": role, "content": m.text })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
            "stream": false,
        });
        if options.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

/// A v2 chat reply carries one assistant message; its text items form a
/// single choice.
fn parse_response(value: serde_json::Value) -> Result<Completion, BackendError> {
    let resp: ChatResponse =
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))?;

    let Some(message) = resp.message else {
        return Ok(Completion::default());
    };
    let content: String = message
        .content
        .into_iter()
        .filter(|item| item.kind == "text")
        .map(|item| item.text)
        .collect();

    Ok(Completion {
        choices: vec![Choice {
            content,
            finish_reason: resp.finish_reason,
        }],
    })
}

#[async_trait]
impl ModelClient for CohereClient {
    async fn generate_content(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Option<Completion>, BackendError> {
        debug!(model = %self.model, messages = messages.len(), "Calling Cohere");
        let body = self.build_request_body(messages, options);
        match self.http.post_json("v2/chat", &body).await? {
            Some(value) => parse_response(value).map(Some),
            None => Ok(None),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Cohere
    }

    fn model(&self) -> &str {
        &self.model
    }
}
