//! Hand-rolled `ModelClient` doubles for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use decoy_core::{BackendError, Completion, GenerateOptions, Message};
use decoy_providers::{ModelClient, ProviderKind};

type Scripted = Result<Option<Completion>, BackendError>;

/// Returns one scripted result, then `Ok(None)`. Records the last options.
pub struct ScriptedClient {
    kind: ProviderKind,
    reply: Mutex<Option<Scripted>>,
    options: Mutex<Option<GenerateOptions>>,
    messages: Mutex<Vec<Message>>,
}

impl ScriptedClient {
    pub fn new(reply: Scripted) -> Self {
        Self::for_provider(ProviderKind::OpenAi, reply)
    }

    pub fn for_provider(kind: ProviderKind, reply: Scripted) -> Self {
        Self {
            kind,
            reply: Mutex::new(Some(reply)),
            options: Mutex::new(None),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// A single choice with `text` as content.
    pub fn content(text: &str) -> Self {
        Self::new(Ok(Some(Completion::single(text))))
    }

    pub fn last_options(&self) -> Option<GenerateOptions> {
        self.options.lock().unwrap().clone()
    }

    pub fn last_messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate_content(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Option<Completion>, BackendError> {
        *self.options.lock().unwrap() = Some(options.clone());
        *self.messages.lock().unwrap() = messages.to_vec();
        self.reply.lock().unwrap().take().unwrap_or(Ok(None))
    }

    fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Answers only after `delay`.
pub struct SlowClient {
    delay: Duration,
}

impl SlowClient {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ModelClient for SlowClient {
    async fn generate_content(
        &self,
        _messages: &[Message],
        _options: &GenerateOptions,
    ) -> Result<Option<Completion>, BackendError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(Completion::single(r#"{"headers":{"A":"b"},"body":""}"#)))
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model(&self) -> &str {
        "slow"
    }
}
