//! Client factory — turns a `ProviderConfig` into a ready `ModelClient`.

use std::sync::Arc;

use tracing::debug;

use decoy_core::config::ProviderConfig;
use decoy_core::LlmError;

use crate::anthropic::AnthropicClient;
use crate::cohere::CohereClient;
use crate::google::GeminiClient;
use crate::http_provider::init_error;
use crate::ollama::OllamaClient;
use crate::openai::OpenAiClient;
use crate::registry::{ProviderKind, ProviderSpec};
use crate::traits::ModelClient;

/// Inclusive sampling temperature bounds accepted at initialization.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

/// Construct the backend client named by `config.provider`.
///
/// Validates the provider-specific required fields and builds the HTTP
/// client. No network traffic happens here.
///
/// # Errors
/// * `UnsupportedProvider` — `provider` is not one of the registry names.
/// * `ProviderInitialization` — a required field is missing or invalid.
pub fn initialize(config: &ProviderConfig) -> Result<Arc<dyn ModelClient>, LlmError> {
    let kind: ProviderKind = config.provider.parse()?;
    let spec = kind.spec();

    validate(config, spec)?;

    debug!(
        provider = spec.display_name,
        model = %config.model,
        api_base = config.server_url.as_deref().unwrap_or("default"),
        "Initializing model client"
    );

    let client: Arc<dyn ModelClient> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(config, spec)?),
        ProviderKind::GoogleAi => Arc::new(GeminiClient::google_ai(config, spec)?),
        ProviderKind::Vertex => Arc::new(GeminiClient::vertex(config, spec)?),
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(config, spec)?),
        ProviderKind::Cohere => Arc::new(CohereClient::new(config, spec)?),
        ProviderKind::Ollama => Arc::new(OllamaClient::new(config, spec)?),
    };
    Ok(client)
}

fn validate(config: &ProviderConfig, spec: &ProviderSpec) -> Result<(), LlmError> {
    if !TEMPERATURE_RANGE.contains(&config.temperature) {
        return Err(init_error(
            spec,
            format!("temperature {} is outside [0, 2]", config.temperature),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(init_error(spec, "timeoutSecs must be greater than zero"));
    }
    if config.model.trim().is_empty() {
        return Err(init_error(spec, "model is required"));
    }
    if spec.requires_api_key && config.api_key.trim().is_empty() {
        let hint = spec
            .env_key
            .map(|k| format!(" (set apiKey or {k})"))
            .unwrap_or_default();
        return Err(init_error(spec, format!("apiKey is required{hint}")));
    }
    if spec.requires_cloud_project {
        if is_blank(config.cloud_project.as_deref()) {
            return Err(init_error(spec, "cloudProject is required"));
        }
        if is_blank(config.cloud_location.as_deref()) {
            return Err(init_error(spec, "cloudLocation is required"));
        }
    }
    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// Fill an empty `api_key` from the provider's conventional environment
/// variable (e.g. `OPENAI_API_KEY`). Unknown providers pass through.
pub fn with_env_credentials(mut config: ProviderConfig) -> ProviderConfig {
    if !config.api_key.is_empty() {
        return config;
    }
    let env_key = config
        .provider
        .parse::<ProviderKind>()
        .ok()
        .and_then(|kind| kind.spec().env_key);
    if let Some(var) = env_key {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                debug!(env = var, "Using API key from environment");
                config.api_key = value;
            }
        }
    }
    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(provider: &str) -> ProviderConfig {
        ProviderConfig {
            provider: provider.into(),
            api_key: "test-key".into(),
            cloud_project: Some("prj".into()),
            cloud_location: Some("europe-west4".into()),
            model: "some-model".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_every_registered_provider_initializes() {
        for kind in ProviderKind::ALL {
            let client = initialize(&config_for(kind.name()))
                .unwrap_or_else(|e| panic!("{kind} failed: {e}"));
            assert_eq!(client.provider(), kind);
            assert_eq!(client.model(), "some-model");
        }
    }

    #[test]
    fn test_unknown_provider() {
        let err = initialize(&config_for("huggingface")).err().unwrap();
        assert!(matches!(err, LlmError::UnsupportedProvider(ref p) if p == "huggingface"));
        assert_eq!(err.to_string(), "unsupported llm provider: \"huggingface\"");
    }

    #[test]
    fn test_missing_api_key() {
        for name in ["openai", "googleai", "anthropic", "cohere", "gcp-vertex"] {
            let mut config = config_for(name);
            config.api_key.clear();
            let err = initialize(&config).err().unwrap();
            assert!(
                matches!(err, LlmError::ProviderInitialization { provider, .. } if provider == name),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut config = config_for("ollama");
        config.api_key.clear();
        assert!(initialize(&config).is_ok());
    }

    #[test]
    fn test_vertex_missing_location() {
        let mut config = config_for("gcp-vertex");
        config.cloud_location = None;
        let err = initialize(&config).err().unwrap();
        assert!(err.to_string().contains("cloudLocation"));
    }

    #[test]
    fn test_temperature_out_of_range() {
        for temperature in [-0.1, 2.5, f64::NAN] {
            let mut config = config_for("openai");
            config.temperature = temperature;
            let err = initialize(&config).err().unwrap();
            assert!(matches!(err, LlmError::ProviderInitialization { .. }));
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = config_for("ollama");
        config.timeout_secs = 0;
        let err = initialize(&config).err().unwrap();
        assert!(matches!(err, LlmError::ProviderInitialization { .. }));
        assert!(err.to_string().contains("timeoutSecs"));
    }

    #[test]
    fn test_temperature_bounds_inclusive() {
        for temperature in [0.0, 2.0] {
            let mut config = config_for("openai");
            config.temperature = temperature;
            assert!(initialize(&config).is_ok());
        }
    }

    #[test]
    fn test_empty_model() {
        let mut config = config_for("anthropic");
        config.model = "  ".into();
        let err = initialize(&config).err().unwrap();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn test_with_env_credentials_keeps_explicit_key() {
        let config = with_env_credentials(config_for("openai"));
        assert_eq!(config.api_key, "test-key");
    }

    #[test]
    fn test_with_env_credentials_unknown_provider() {
        let mut config = config_for("nope");
        config.api_key.clear();
        assert!(with_env_credentials(config).api_key.is_empty());
    }
}
