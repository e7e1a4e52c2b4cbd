//! `ModelClient` trait — the capability every backend adapter implements.

use async_trait::async_trait;
use decoy_core::{BackendError, Completion, GenerateOptions, Message};

use crate::registry::ProviderKind;

/// An initialized handle to one LLM backend.
///
/// Implementations hold only connection settings (HTTP client, endpoint,
/// credentials), never per-call state, so one instance can serve many
/// concurrent calls behind an `Arc`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate completions for an ordered message sequence.
    ///
    /// # Returns
    /// * `Ok(Some(_))` — the backend's candidate completions (maybe none).
    /// * `Ok(None)`    — the backend answered with no payload at all.
    /// * `Err(_)`      — transport, status, or decoding failure.
    async fn generate_content(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Option<Completion>, BackendError>;

    /// Which backend this client talks to.
    fn provider(&self) -> ProviderKind;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str {
        self.provider().spec().display_name
    }
}
