//! Error taxonomy for provider setup, prompt building, and response
//! processing.
//!
//! Every failure is returned to the immediate caller with its cause
//! attached; nothing here is fatal to the process. The caller decides
//! whether to retry, fall back to a canned response, or fail the HTTP
//! exchange.

use std::time::Duration;

/// Boxed error from a transport layer (e.g. `reqwest::Error`).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a backend adapter during one generation call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never completed (connect, TLS, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx with a body we could not decode.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl BackendError {
    /// Wrap any transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        BackendError::Transport(Box::new(err))
    }
}

/// The three ways a backend can return nothing usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyResponseKind {
    /// No response object at all.
    NilResponse,
    /// A response with an empty choice list.
    NoChoices,
    /// The first choice carried an empty string.
    EmptyContent,
}

impl std::fmt::Display for EmptyResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            EmptyResponseKind::NilResponse => "response is nil",
            EmptyResponseKind::NoChoices => "no choices available",
            EmptyResponseKind::EmptyContent => "content of first choice is empty",
        };
        f.write_str(msg)
    }
}

/// Unified error type for the Decoy LLM pipeline.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    // === Provider setup ===
    #[error("unsupported llm provider: {0:?}")]
    UnsupportedProvider(String),

    #[error("failed to initialize {provider} client: {message}")]
    ProviderInitialization {
        provider: &'static str,
        message: String,
    },

    // === Prompt building ===
    #[error("cannot serialize HTTP request: {0}")]
    MalformedRequest(String),

    #[error("invalid user prompt template: {0}")]
    InvalidPromptTemplate(String),

    // === Generation ===
    #[error("temperature {0} is outside [0, 2]")]
    InvalidTemperature(f64),

    #[error("content generation failed ({provider}): {source}")]
    ContentGeneration {
        provider: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("empty LLM response: {0}")]
    EmptyResponse(EmptyResponseKind),

    #[error("LLM output is not valid JSON: {source}")]
    MalformedJson {
        cleaned: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid JSON response: {reason}")]
    InvalidJsonResponse { cleaned: String, reason: String },

    // === Cancellation ===
    #[error("generation cancelled by caller")]
    Cancelled,

    #[error("generation deadline exceeded after {after:?}")]
    DeadlineExceeded { after: Duration },
}

impl LlmError {
    /// Whether a fresh attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::ContentGeneration { .. }
                | LlmError::EmptyResponse(_)
                | LlmError::DeadlineExceeded { .. }
        )
    }

    /// The cleaned model output attached to JSON failures, for logging.
    pub fn cleaned_response(&self) -> Option<&str> {
        match self {
            LlmError::MalformedJson { cleaned, .. }
            | LlmError::InvalidJsonResponse { cleaned, .. } => Some(cleaned),
            _ => None,
        }
    }
}
