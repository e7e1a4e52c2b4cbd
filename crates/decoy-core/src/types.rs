//! Core types for Decoy — prompt messages, backend completions, and the
//! generated HTTP response.
//!
//! Every backend adapter translates between these types and its own wire
//! format, so the prompt and response pipelines never see provider JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// Who a prompt message speaks for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// The end user's turn (carries the captured HTTP request).
    Human,
}

/// A role-tagged unit of model input.
///
/// Sequences are ordered: a system message, when present, comes first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            text: text.into(),
        }
    }

    /// Create a human message.
    pub fn human(text: impl Into<String>) -> Self {
        Message {
            role: Role::Human,
            text: text.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Generation options
// ─────────────────────────────────────────────

/// Per-call options passed to a model client.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerateOptions {
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Ask the backend for JSON-formatted output where it supports it.
    pub json_mode: bool,
}

impl GenerateOptions {
    /// JSON-mode options at the given temperature.
    pub fn json(temperature: f64) -> Self {
        Self {
            temperature,
            json_mode: true,
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            json_mode: true,
        }
    }
}

// ─────────────────────────────────────────────
// Completions
// ─────────────────────────────────────────────

/// What a backend returned for one invocation.
///
/// Adapters return `Option<Completion>`; `None` means the backend answered
/// without any usable payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Completion {
    /// Candidate completions in backend order. Callers use the first.
    pub choices: Vec<Choice>,
}

impl Completion {
    /// Completion with a single text choice.
    pub fn single(content: impl Into<String>) -> Self {
        Completion {
            choices: vec![Choice::new(content)],
        }
    }

    /// The first choice, if any.
    pub fn first(&self) -> Option<&Choice> {
        self.choices.first()
    }
}

/// One candidate completion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Choice {
    /// Generated text (possibly wrapped in markdown fences).
    pub content: String,
    /// Why the model stopped generating, as reported by the backend.
    pub finish_reason: Option<String>,
}

impl Choice {
    pub fn new(content: impl Into<String>) -> Self {
        Choice {
            content: content.into(),
            finish_reason: None,
        }
    }
}

// ─────────────────────────────────────────────
// Generated response
// ─────────────────────────────────────────────

/// The synthetic HTTP response produced by the model.
///
/// Both fields are required. `headers` must be non-empty; `body` may be an
/// empty string but the key has to be present in the model output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedResponse {
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl GeneratedResponse {
    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_constructors() {
        let sys = Message::system("be a web server");
        assert_eq!(sys.role, Role::System);
        assert_eq!(sys.text, "be a web server");

        let human = Message::human("GET / HTTP/1.1");
        assert_eq!(human.role, Role::Human);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_value(Message::human("hi")).unwrap();
        assert_eq!(json["role"], "human");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn test_generate_options_json() {
        let opts = GenerateOptions::json(0.3);
        assert!(opts.json_mode);
        assert_eq!(opts.temperature, 0.3);
    }

    #[test]
    fn test_completion_first_choice() {
        let completion = Completion {
            choices: vec![Choice::new("one"), Choice::new("two")],
        };
        assert_eq!(completion.first().unwrap().content, "one");
        assert!(Completion::default().first().is_none());
    }

    #[test]
    fn test_generated_response_deserialization() {
        let value = json!({
            "headers": {"Content-Type": "text/html", "Server": "nginx"},
            "body": "<html></html>"
        });
        let resp: GeneratedResponse = serde_json::from_value(value).unwrap();
        assert_eq!(resp.headers.len(), 2);
        assert_eq!(resp.header("content-type"), Some("text/html"));
        assert_eq!(resp.body, "<html></html>");
    }
}
