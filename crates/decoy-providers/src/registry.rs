//! Provider registry — static specs for the supported LLM backends.
//!
//! Each `ProviderSpec` describes how to reach one backend and what it can
//! do. The table is process-wide read-only data: adding a backend means one
//! new `ProviderKind` variant, one entry here, and one initializer in
//! [`crate::factory`].

use std::fmt;
use std::str::FromStr;

use decoy_core::LlmError;

// ─────────────────────────────────────────────
// ProviderKind — the closed set of backends
// ─────────────────────────────────────────────

/// Supported LLM backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenAI chat completions (and compatible servers).
    OpenAi,
    /// Google AI Studio (Gemini API with an API key).
    GoogleAi,
    /// Gemini on Google Cloud Vertex AI.
    Vertex,
    /// Anthropic Messages API.
    Anthropic,
    /// Cohere Chat API v2.
    Cohere,
    /// Self-hosted Ollama runtime.
    Ollama,
}

impl ProviderKind {
    /// Every supported backend, in registry order.
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::OpenAi,
        ProviderKind::GoogleAi,
        ProviderKind::Vertex,
        ProviderKind::Anthropic,
        ProviderKind::Cohere,
        ProviderKind::Ollama,
    ];

    /// Static spec for this backend.
    pub fn spec(self) -> &'static ProviderSpec {
        let idx = match self {
            ProviderKind::OpenAi => 0,
            ProviderKind::GoogleAi => 1,
            ProviderKind::Vertex => 2,
            ProviderKind::Anthropic => 3,
            ProviderKind::Cohere => 4,
            ProviderKind::Ollama => 5,
        };
        &PROVIDERS[idx]
    }

    /// Config name (e.g. `"gcp-vertex"`).
    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    /// Exact, case-sensitive match on the config name. No fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_by_name(s)
            .map(|spec| spec.kind)
            .ok_or_else(|| LlmError::UnsupportedProvider(s.to_string()))
    }
}

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM backend.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Which backend this entry describes.
    pub kind: ProviderKind,
    /// Config name (e.g. `"openai"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"OpenAI"`.
    pub display_name: &'static str,
    /// Conventional environment variable holding the credential.
    pub env_key: Option<&'static str>,
    /// Default API base URL. `None` when it must be derived from config.
    pub default_api_base: Option<&'static str>,
    /// Whether the backend honors a distinct system role.
    /// Without it the system prompt is folded into the human turn.
    pub supports_system_prompt: bool,
    /// Whether initialization requires a non-empty `api_key`.
    pub requires_api_key: bool,
    /// Whether initialization requires `cloud_project` and `cloud_location`.
    pub requires_cloud_project: bool,
}

/// Complete list of supported backends, indexed by `ProviderKind::spec`.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::OpenAi,
        name: "openai",
        display_name: "OpenAI",
        env_key: Some("OPENAI_API_KEY"),
        default_api_base: Some("https://api.openai.com/v1"),
        supports_system_prompt: true,
        requires_api_key: true,
        requires_cloud_project: false,
    },
    ProviderSpec {
        kind: ProviderKind::GoogleAi,
        name: "googleai",
        display_name: "Google AI",
        env_key: Some("GOOGLE_API_KEY"),
        default_api_base: Some("https://generativelanguage.googleapis.com"),
        supports_system_prompt: false,
        requires_api_key: true,
        requires_cloud_project: false,
    },
    ProviderSpec {
        kind: ProviderKind::Vertex,
        name: "gcp-vertex",
        display_name: "Vertex AI",
        env_key: Some("GOOGLE_CLOUD_ACCESS_TOKEN"),
        // Derived from cloud_location.
        default_api_base: None,
        supports_system_prompt: false,
        requires_api_key: true,
        requires_cloud_project: true,
    },
    ProviderSpec {
        kind: ProviderKind::Anthropic,
        name: "anthropic",
        display_name: "Anthropic",
        env_key: Some("ANTHROPIC_API_KEY"),
        default_api_base: Some("https://api.anthropic.com"),
        supports_system_prompt: true,
        requires_api_key: true,
        requires_cloud_project: false,
    },
    ProviderSpec {
        kind: ProviderKind::Cohere,
        name: "cohere",
        display_name: "Cohere",
        env_key: Some("COHERE_API_KEY"),
        default_api_base: Some("https://api.cohere.com"),
        supports_system_prompt: true,
        requires_api_key: true,
        requires_cloud_project: false,
    },
    ProviderSpec {
        kind: ProviderKind::Ollama,
        name: "ollama",
        display_name: "Ollama",
        env_key: None,
        default_api_base: Some("http://localhost:11434"),
        supports_system_prompt: true,
        requires_api_key: false,
        requires_cloud_project: false,
    },
];

// ─────────────────────────────────────────────
// Lookup functions
// ─────────────────────────────────────────────

/// Find a provider spec by exact config name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Whether `kind` receives the system prompt as its own message.
pub fn supports_system_prompt(kind: ProviderKind) -> bool {
    kind.spec().supports_system_prompt
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_index_matches_kind() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.spec().kind, kind);
        }
    }

    #[test]
    fn test_provider_count() {
        assert_eq!(PROVIDERS.len(), ProviderKind::ALL.len());
    }

    #[test]
    fn test_all_providers_have_unique_names() {
        let names: Vec<&str> = PROVIDERS.iter().map(|s| s.name).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len(), "Duplicate provider names found");
    }

    #[test]
    fn test_parse_known_names() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("googleai".parse::<ProviderKind>().unwrap(), ProviderKind::GoogleAi);
        assert_eq!("gcp-vertex".parse::<ProviderKind>().unwrap(), ProviderKind::Vertex);
        assert_eq!("anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("cohere".parse::<ProviderKind>().unwrap(), ProviderKind::Cohere);
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = "mistral".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedProvider(ref p) if p == "mistral"));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("OpenAI".parse::<ProviderKind>().is_err());
        assert!("".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_system_prompt_capability_table() {
        assert!(supports_system_prompt(ProviderKind::OpenAi));
        assert!(supports_system_prompt(ProviderKind::Anthropic));
        assert!(supports_system_prompt(ProviderKind::Ollama));
        assert!(supports_system_prompt(ProviderKind::Cohere));
        assert!(!supports_system_prompt(ProviderKind::GoogleAi));
        assert!(!supports_system_prompt(ProviderKind::Vertex));
    }

    #[test]
    fn test_only_vertex_requires_cloud_project() {
        let needing: Vec<&str> = PROVIDERS
            .iter()
            .filter(|s| s.requires_cloud_project)
            .map(|s| s.name)
            .collect();
        assert_eq!(needing, vec!["gcp-vertex"]);
    }

    #[test]
    fn test_display_uses_config_name() {
        assert_eq!(ProviderKind::Vertex.to_string(), "gcp-vertex");
    }
}
