//! Config loader — reads `~/.decoy/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.decoy/config.json`
//! 3. Environment variables `DECOY_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `DECOY_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `DECOY_LLM__PROVIDER`, `DECOY_LLM__API_KEY`, `DECOY_LLM__MODEL`
/// - `DECOY_LLM__SERVER_URL`, `DECOY_LLM__CLOUD_PROJECT`, `DECOY_LLM__CLOUD_LOCATION`
/// - `DECOY_LLM__TEMPERATURE`, `DECOY_LLM__MAX_TOKENS`, `DECOY_LLM__TIMEOUT_SECS`
/// - `DECOY_PROMPTS__SYSTEM_PROMPT`, `DECOY_PROMPTS__USER_PROMPT`
fn apply_env_overrides(mut config: Config) -> Config {
    let llm = &mut config.llm;

    if let Ok(val) = std::env::var("DECOY_LLM__PROVIDER") {
        llm.provider = val;
    }
    if let Ok(val) = std::env::var("DECOY_LLM__API_KEY") {
        llm.api_key = val;
    }
    if let Ok(val) = std::env::var("DECOY_LLM__MODEL") {
        llm.model = val;
    }
    if let Ok(val) = std::env::var("DECOY_LLM__SERVER_URL") {
        llm.server_url = Some(val);
    }
    if let Ok(val) = std::env::var("DECOY_LLM__CLOUD_PROJECT") {
        llm.cloud_project = Some(val);
    }
    if let Ok(val) = std::env::var("DECOY_LLM__CLOUD_LOCATION") {
        llm.cloud_location = Some(val);
    }
    if let Ok(val) = std::env::var("DECOY_LLM__TEMPERATURE") {
        match val.parse::<f64>() {
            Ok(t) => llm.temperature = t,
            Err(_) => warn!(value = %val, "ignoring non-numeric DECOY_LLM__TEMPERATURE"),
        }
    }
    if let Ok(val) = std::env::var("DECOY_LLM__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            llm.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("DECOY_LLM__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            llm.timeout_secs = n;
        }
    }

    if let Ok(val) = std::env::var("DECOY_PROMPTS__SYSTEM_PROMPT") {
        config.prompts.system_prompt = val;
    }
    if let Ok(val) = std::env::var("DECOY_PROMPTS__USER_PROMPT") {
        config.prompts.user_prompt = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
