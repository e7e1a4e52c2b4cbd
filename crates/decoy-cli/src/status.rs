//! `decoy status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use decoy_core::config::{get_config_path, load_config};
use decoy_providers::{with_env_credentials, ProviderKind, PROVIDERS};

use crate::helpers::{mark, mask_secret};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();
    let llm = with_env_credentials(config.llm.clone());

    println!();
    println!("{}", "Decoy Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    let known = llm.provider.parse::<ProviderKind>().ok();
    println!(
        "  {:<18} {} {}",
        "Provider:".bold(),
        llm.provider,
        match known {
            Some(kind) => kind.spec().display_name.dimmed().to_string(),
            None => "(unsupported)".red().to_string(),
        }
    );
    println!("  {:<18} {}", "Model:".bold(), llm.model);
    println!(
        "  {:<18} {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", llm.temperature).dimmed(),
        llm.timeout_secs,
    );
    if let Some(url) = llm.server_url.as_deref() {
        println!("  {:<18} {}", "Server URL:".bold(), url);
    }

    let key_status = match known {
        Some(kind) if !kind.spec().requires_api_key && llm.api_key.is_empty() => {
            "not required".dimmed().to_string()
        }
        _ if llm.api_key.is_empty() => format!("{}", "· not set".red()),
        _ => format!("{} {}", "✓".green(), mask_secret(&llm.api_key).dimmed()),
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);

    println!();
    println!("  {}", "Providers:".bold());
    println!(
        "    {:<12} {:<12} {:<8} {}",
        "name".dimmed(),
        "display".dimmed(),
        "system".dimmed(),
        "credential".dimmed()
    );
    for spec in PROVIDERS {
        let credential = match spec.env_key {
            Some(var) => {
                let set = std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false);
                format!("{var} {}", if set { mark(true) } else { "·".dimmed().to_string() })
            }
            None => "none".dimmed().to_string(),
        };
        println!(
            "    {:<12} {:<12} {:<8} {}",
            spec.name,
            spec.display_name,
            mark(spec.supports_system_prompt),
            credential
        );
    }
    println!();

    Ok(())
}
