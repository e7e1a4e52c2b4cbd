//! Ollama adapter for self-hosted models.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
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
    message: Option<ChatMessage>,
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Client for `POST {base}/api/chat` with streaming disabled.
#[derive(Debug)]
pub struct OllamaClient {
    http: HttpBackend,
    model: String,
}

impl OllamaClient {
    /// No credential is required. A non-empty `api_key` is still sent as a
    /// Bearer token for instances behind an authenticating proxy.
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, LlmError> {
        let api_base = resolve_api_base(config, spec)?;
        let headers = if config.api_key.is_empty() {
            HeaderMap::new()
        } else {
            bearer_headers(spec, &config.api_key)?
        };
        Ok(OllamaClient {
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
            "stream": false,
            "options": { "temperature": options.temperature },
        });
        if options.json_mode {
            body["format"] = json!("json");
        }
        body
    }
}

fn parse_response(value: serde_json::Value) -> Result<Completion, BackendError> {
    let resp: ChatResponse =
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))?;

    Ok(match resp.message {
        Some(message) => Completion {
            choices: vec![Choice {
                content: message.content,
                finish_reason: resp.done_reason,
            }],
        },
        None => Completion::default(),
    })
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate_content(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Option<Completion>, BackendError> {
        debug!(model = %self.model, messages = messages.len(), "Calling Ollama");
        let body = self.build_request_body(messages, options);
        match self.http.post_json("api/chat", &body).await? {
            Some(value) => parse_response(value).map(Some),
            None => Ok(None),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(base: &str) -> OllamaClient {
        let config = ProviderConfig {
            provider: "ollama".into(),
            server_url: Some(base.to_string()),
            model: "llama3.1".into(),
            ..Default::default()
        };
        OllamaClient::new(&config, ProviderKind::Ollama.spec()).unwrap()
    }

    #[test]
    fn test_build_request_body() {
        let client = make_client("http://unused");
        let body = client.build_request_body(&[Message::human("GET /")], &GenerateOptions::json(0.9));
        assert_eq!(body["stream"], false);
        assert_eq!(body["format"], "json");
        assert_eq!(body["options"]["temperature"], 0.9);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({ "model": "llama3.1", "stream": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1",
                "message": { "role": "assistant", "content": "```json\n{\"headers\":{},\"body\":\"\"}\n```" },
                "done": true,
                "done_reason": "stop"
            })))
            .mount(&mock_server)
            .await;

        let completion = make_client(&mock_server.uri())
            .generate_content(&[Message::human("x")], &GenerateOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert!(completion.choices[0].content.starts_with("```json"));
        assert_eq!(completion.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_generate_empty_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let completion = make_client(&mock_server.uri())
            .generate_content(&[Message::human("x")], &GenerateOptions::default())
            .await
            .unwrap();
        assert!(completion.is_none());
    }
}
