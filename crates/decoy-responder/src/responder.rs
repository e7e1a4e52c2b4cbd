//! `Responder` — prompt building and generation behind one call.

use std::sync::Arc;

use tracing::debug;

use decoy_core::config::PromptConfig;
use decoy_core::{CallContext, GeneratedResponse, HttpRequest, LlmError};
use decoy_providers::ModelClient;

use crate::prompt::PromptBuilder;
use crate::response::ResponseProcessor;

/// An initialized client plus the prompt templates and sampling
/// temperature. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Responder {
    client: Arc<dyn ModelClient>,
    prompts: PromptBuilder,
    processor: ResponseProcessor,
    temperature: f64,
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("provider", &self.client.provider().name())
            .field("model", &self.client.model())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Responder {
    pub fn new(
        client: Arc<dyn ModelClient>,
        prompts: &PromptConfig,
        temperature: f64,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client,
            prompts: PromptBuilder::new(prompts)?,
            processor: ResponseProcessor::new(),
            temperature,
        })
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<dyn ModelClient> {
        &self.client
    }

    /// Generate a response for `request`.
    pub async fn respond(
        &self,
        request: &HttpRequest,
        ctx: &CallContext,
    ) -> Result<GeneratedResponse, LlmError> {
        let messages = self.prompts.build(request, self.client.provider())?;
        debug!(messages = messages.len(), "Dispatching to model");
        self.processor
            .generate(self.client.as_ref(), self.temperature, &messages, ctx)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;
    use decoy_core::Role;
    use decoy_providers::ProviderKind;

    #[tokio::test]
    async fn test_respond_end_to_end() {
        let client = Arc::new(ScriptedClient::for_provider(
            ProviderKind::Anthropic,
            Ok(Some(decoy_core::Completion::single(
                r#"{"headers":{"Server":"nginx/1.18.0"},"body":"<h1>Welcome</h1>"}"#,
            ))),
        ));
        let responder = Responder::new(client.clone(), &PromptConfig::default(), 0.3).unwrap();

        let request = HttpRequest::new("GET", "/").with_host("victim.local");
        let resp = responder
            .respond(&request, &CallContext::background())
            .await
            .unwrap();
        assert_eq!(resp.header("server"), Some("nginx/1.18.0"));

        let sent = client.last_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, Role::System);
        assert!(sent[1].text.contains("GET / HTTP/1.1\r\nHost: victim.local"));
        assert_eq!(client.last_options().unwrap().temperature, 0.3);
        assert_eq!(responder.client().display_name(), "Anthropic");
        assert_eq!(responder.client().model(), "scripted");
    }

    #[tokio::test]
    async fn test_respond_folds_system_prompt_for_gemini() {
        let client = Arc::new(ScriptedClient::for_provider(
            ProviderKind::GoogleAi,
            Ok(Some(decoy_core::Completion::single(r#"{"headers":{"A":"b"},"body":""}"#))),
        ));
        let responder = Responder::new(client.clone(), &PromptConfig::default(), 1.0).unwrap();
        responder
            .respond(&HttpRequest::new("HEAD", "/robots.txt"), &CallContext::background())
            .await
            .unwrap();

        let sent = client.last_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].role, Role::Human);
    }

    #[tokio::test]
    async fn test_respond_malformed_request_skips_model() {
        let client = Arc::new(ScriptedClient::content("unused"));
        let responder = Responder::new(client.clone(), &PromptConfig::default(), 1.0).unwrap();
        let err = responder
            .respond(&HttpRequest::new("G ET", "/"), &CallContext::background())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedRequest(_)));
        assert!(client.last_options().is_none());
    }

    #[test]
    fn test_new_rejects_bad_template() {
        let prompts = PromptConfig {
            system_prompt: "s".into(),
            user_prompt: "no placeholder".into(),
        };
        let client = Arc::new(ScriptedClient::content("x"));
        assert!(matches!(
            Responder::new(client, &prompts, 1.0),
            Err(LlmError::InvalidPromptTemplate(_))
        ));
    }
}
