//! Anthropic Messages API adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use decoy_core::config::ProviderConfig;
use decoy_core::{BackendError, Choice, Completion, GenerateOptions, LlmError, Message, Role};

use crate::http_provider::{header_map, resolve_api_base, HttpBackend};
use crate::registry::{ProviderKind, ProviderSpec};
use crate::traits::ModelClient;

/// Value of the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The Messages API rejects temperatures above this.
const MAX_TEMPERATURE: f64 = 1.0;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

// ─────────────────────────────────────────────
// AnthropicClient
// ─────────────────────────────────────────────

/// Client for `POST {base}/v1/messages`.
#[derive(Debug)]
pub struct AnthropicClient {
    http: HttpBackend,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, LlmError> {
        let api_base = resolve_api_base(config, spec)?;
        let headers = header_map(
            spec,
            &[
                ("x-api-key", config.api_key.clone()),
                ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ],
        )?;
        Ok(AnthropicClient {
            http: HttpBackend::new(config, spec, &api_base, headers)?,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// System messages go to the top-level `system` field; the rest become
    /// `user` turns.
    fn build_request_body(&self, messages: &[Message], options: &GenerateOptions) -> serde_json::Value {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.text.as_str())
            .collect();
        let turns: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role == Role::Human)
            .map(|m| json!({ "role": "user", "content": m.text }))
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": turns,
            "temperature": options.temperature.min(MAX_TEMPERATURE),
        });
        if !system.is_empty() {
            body["system"] = json!(system.join("\n\n"));
        }
        body
    }
}

fn parse_response(value: serde_json::Value) -> Result<Completion, BackendError> {
    let MessagesResponse {
        content,
        stop_reason,
    } = serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))?;

    let choices = content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(Choice {
                content: text,
                finish_reason: stop_reason.clone(),
            }),
            ContentBlock::Other => None,
        })
        .collect();
    Ok(Completion { choices })
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn generate_content(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Option<Completion>, BackendError> {
        debug!(model = %self.model, messages = messages.len(), "Calling Anthropic");
        let body = self.build_request_body(messages, options);
        match self.http.post_json("v1/messages", &body).await? {
            Some(value) => parse_response(value).map(Some),
            None => Ok(None),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(base: &str) -> AnthropicClient {
        let config = ProviderConfig {
            provider: "anthropic".into(),
            api_key: "sk-ant-test".into(),
            server_url: Some(base.to_string()),
            model: "claude-3-5-haiku-latest".into(),
            max_tokens: 1024,
            ..Default::default()
        };
        AnthropicClient::new(&config, ProviderKind::Anthropic.spec()).unwrap()
    }

    #[test]
    fn test_system_prompt_moves_to_top_level() {
        let client = make_client("http://unused");
        let body = client.build_request_body(
            &[Message::system("be apache"), Message::human("GET /")],
            &GenerateOptions::json(0.7),
        );
        assert_eq!(body["system"], "be apache");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["temperature"], 0.7);
    }

    #[test]
    fn test_temperature_is_capped() {
        let client = make_client("http://unused");
        let body = client.build_request_body(&[Message::human("x")], &GenerateOptions::json(1.8));
        assert_eq!(body["temperature"], 1.0);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_parse_response_skips_non_text_blocks() {
        let completion = parse_response(json!({
            "content": [
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": "{\"body\":\"a\"}" },
                { "type": "text", "text": "second" }
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();
        assert_eq!(completion.choices.len(), 2);
        assert_eq!(completion.choices[0].content, "{\"body\":\"a\"}");
        assert_eq!(completion.choices[1].finish_reason.as_deref(), Some("end_turn"));
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({ "model": "claude-3-5-haiku-latest" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_01",
                "type": "message",
                "content": [{ "type": "text", "text": "{\"headers\":{\"Server\":\"nginx\"},\"body\":\"\"}" }],
                "stop_reason": "end_turn"
            })))
            .mount(&mock_server)
            .await;

        let completion = make_client(&mock_server.uri())
            .generate_content(
                &[Message::system("s"), Message::human("GET /")],
                &GenerateOptions::default(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completion.choices.len(), 1);
        assert!(completion.choices[0].content.contains("nginx"));
    }

    #[tokio::test]
    async fn test_generate_overloaded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let err = make_client(&mock_server.uri())
            .generate_content(&[Message::human("x")], &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 529, .. }));
    }
}
