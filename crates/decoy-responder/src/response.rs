//! Response processor — invokes the model and turns its raw text into a
//! validated [`GeneratedResponse`].
//!
//! Pipeline: invoke under the call context, take the first choice, strip
//! markdown fences, parse, check the result against [`RESPONSE_RULES`],
//! decode.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use decoy_core::{CallContext, EmptyResponseKind, GenerateOptions, GeneratedResponse, LlmError, Message};
use decoy_providers::factory::TEMPERATURE_RANGE;
use decoy_providers::ModelClient;

// ─────────────────────────────────────────────
// Fence cleaning
// ─────────────────────────────────────────────

/// A leading fence (optionally tagged `json`), or any other fence marker.
const FENCE_PATTERN: &str = r"^```(?:json)?|```";

fn fence_regex() -> &'static Regex {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    FENCE_RE.get_or_init(|| Regex::new(FENCE_PATTERN).expect("fence pattern is a valid regex"))
}

/// Remove markdown code fences and surrounding whitespace.
///
/// One pass: fences exposed by the removal are not stripped again.
pub fn clean_response(raw: &str) -> String {
    fence_regex().replace_all(raw, "").trim().to_string()
}

// ─────────────────────────────────────────────
// Validation rules
// ─────────────────────────────────────────────

/// Expected JSON type of a response field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string.
    String,
    /// A JSON object whose values are all strings.
    StringMap,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::StringMap => "an object of strings",
        }
    }
}

/// One constraint on a top-level field of the model output.
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Reject an empty string or object.
    pub non_empty: bool,
}

/// Constraints a generated response must satisfy. Unknown fields are ignored.
pub const RESPONSE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "headers",
        kind: FieldKind::StringMap,
        required: true,
        non_empty: true,
    },
    FieldRule {
        field: "body",
        kind: FieldKind::String,
        required: true,
        non_empty: false,
    },
];

fn check_rule(object: &Map<String, Value>, rule: &FieldRule) -> Result<(), String> {
    let Some(value) = object.get(rule.field) else {
        return if rule.required {
            Err(format!("missing required field \"{}\"", rule.field))
        } else {
            Ok(())
        };
    };

    let empty = match (rule.kind, value) {
        (FieldKind::String, Value::String(s)) => s.is_empty(),
        (FieldKind::StringMap, Value::Object(map)) => {
            if let Some((key, _)) = map.iter().find(|(_, v)| !v.is_string()) {
                return Err(format!(
                    "field \"{}\" entry \"{key}\" must be a string",
                    rule.field
                ));
            }
            map.is_empty()
        }
        _ => {
            return Err(format!(
                "field \"{}\" must be {}",
                rule.field,
                rule.kind.describe()
            ))
        }
    };

    if rule.non_empty && empty {
        return Err(format!("field \"{}\" must not be empty", rule.field));
    }
    Ok(())
}

/// Parse and validate a cleaned model response.
///
/// # Errors
/// * `MalformedJson` — `cleaned` is not syntactically JSON.
/// * `InvalidJsonResponse` — JSON, but not an object satisfying [`RESPONSE_RULES`].
pub fn validate_json(cleaned: &str) -> Result<GeneratedResponse, LlmError> {
    let value: Value = serde_json::from_str(cleaned).map_err(|source| LlmError::MalformedJson {
        cleaned: cleaned.to_string(),
        source,
    })?;

    let invalid = |reason: String| LlmError::InvalidJsonResponse {
        cleaned: cleaned.to_string(),
        reason,
    };

    let Value::Object(object) = &value else {
        return Err(invalid("expected a JSON object".to_string()));
    };
    for rule in RESPONSE_RULES {
        check_rule(object, rule).map_err(&invalid)?;
    }

    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

// ─────────────────────────────────────────────
// ResponseProcessor
// ─────────────────────────────────────────────

/// Drives one model invocation and validates the result.
///
/// Stateless; no retries happen here.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseProcessor;

impl ResponseProcessor {
    pub fn new() -> Self {
        ResponseProcessor
    }

    /// Invoke `client` in JSON mode and return the validated response.
    ///
    /// A `temperature` outside [0, 2] fails with `InvalidTemperature`
    /// before the backend is called.
    pub async fn generate(
        &self,
        client: &dyn ModelClient,
        temperature: f64,
        messages: &[Message],
        ctx: &CallContext,
    ) -> Result<GeneratedResponse, LlmError> {
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(LlmError::InvalidTemperature(temperature));
        }
        let options = GenerateOptions::json(temperature);
        let provider = client.provider().name();

        debug!(
            provider = %client.display_name(),
            model = client.model(),
            temperature,
            "Generating response"
        );

        let completion = ctx
            .run(client.generate_content(messages, &options))
            .await?
            .map_err(|source| LlmError::ContentGeneration { provider, source })?;

        let completion = completion.ok_or(LlmError::EmptyResponse(EmptyResponseKind::NilResponse))?;
        let choice = completion
            .first()
            .ok_or(LlmError::EmptyResponse(EmptyResponseKind::NoChoices))?;
        if choice.content.is_empty() {
            return Err(LlmError::EmptyResponse(EmptyResponseKind::EmptyContent));
        }

        debug!(
            provider,
            choices = completion.choices.len(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("-"),
            content_len = choice.content.len(),
            "Model answered"
        );

        let cleaned = clean_response(&choice.content);
        let response = validate_json(&cleaned)?;

        debug!(headers = response.headers.len(), body_len = response.body.len(), "Response validated");
        Ok(response)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
