//! Prompt builder — turns a captured HTTP request into model messages.

use tracing::debug;

use decoy_core::config::{PromptConfig, REQUEST_PLACEHOLDER};
use decoy_core::{HttpRequest, LlmError, Message};
use decoy_providers::{supports_system_prompt, ProviderKind};

/// Builds the message sequence for one request.
///
/// Holds the two templates from [`PromptConfig`]. The user template must
/// carry the [`REQUEST_PLACEHOLDER`]; only its first occurrence is filled.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    system_prompt: String,
    user_prompt: String,
}

impl PromptBuilder {
    /// Create a builder, rejecting a user template without a placeholder.
    pub fn new(prompts: &PromptConfig) -> Result<Self, LlmError> {
        if !prompts.user_prompt.contains(REQUEST_PLACEHOLDER) {
            return Err(LlmError::InvalidPromptTemplate(format!(
                "user prompt must contain {REQUEST_PLACEHOLDER}"
            )));
        }
        Ok(Self {
            system_prompt: prompts.system_prompt.clone(),
            user_prompt: prompts.user_prompt.clone(),
        })
    }

    /// Build the messages for `request` addressed to `provider`.
    ///
    /// Backends with a system role get `[System, Human]`; the others get a
    /// single human message with the system prompt prepended.
    pub fn build(&self, request: &HttpRequest, provider: ProviderKind) -> Result<Vec<Message>, LlmError> {
        let dump = request.dump()?;
        let user_prompt = self.render_user_prompt(dump.trim());

        debug!(
            provider = provider.name(),
            method = %request.method,
            uri = %request.uri,
            prompt_len = user_prompt.len(),
            "Built prompt"
        );

        if supports_system_prompt(provider) {
            Ok(vec![
                Message::system(self.system_prompt.clone()),
                Message::human(user_prompt),
            ])
        } else {
            Ok(vec![Message::human(format!(
                "{}\n{}",
                self.system_prompt, user_prompt
            ))])
        }
    }

    fn render_user_prompt(&self, dump: &str) -> String {
        self.user_prompt.replacen(REQUEST_PLACEHOLDER, dump, 1)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
