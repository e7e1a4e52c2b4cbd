//! `decoy onboard` — write the default configuration.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use decoy_core::config::{get_config_path, save_config, Config};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "Decoy — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    let created = write_default_config(&config_path)?;
    if created {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "{}",
        "  Set llm.provider, llm.model and llm.apiKey, then run `decoy status`.".green()
    );
    println!();
    Ok(())
}

/// Write defaults to `path` unless a file is already there. Returns whether
/// a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert!(write_default_config(&path).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"userPrompt\""));
        assert!(written.contains("\"provider\": \"openai\""));

        std::fs::write(&path, "{}").unwrap();
        assert!(!write_default_config(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
