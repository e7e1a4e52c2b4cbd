//! Decoy CLI — entry point.
//!
//! # Commands
//!
//! - `decoy respond [--request FILE] [--json]` — generate a response for one captured request
//! - `decoy onboard` — write the default config
//! - `decoy status` — show configuration and provider status

mod helpers;
mod onboard;
mod respond;
mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Decoy — LLM-generated HTTP responses for honeypots
#[derive(Parser)]
#[command(name = "decoy", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a response for a captured HTTP request
    Respond {
        /// File holding the request. Reads stdin when omitted.
        #[arg(short, long)]
        request: Option<PathBuf>,

        /// The request is the JSON form instead of raw HTTP
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Config file (default: ~/.decoy/config.json)
        #[arg(short, long)]
        config: Option<String>,

        /// Abort the model call after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Emit logs as JSON lines
        #[arg(long, default_value_t = false)]
        log_json: bool,
    },

    /// Write the default configuration
    Onboard,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Respond {
            request,
            json,
            config,
            timeout,
            logs,
            log_json,
        } => {
            init_logging(logs, log_json);
            let config_path = config.as_deref().map(helpers::expand_tilde);
            respond::run(respond::RespondArgs {
                request,
                json,
                config: config_path,
                timeout,
            })
            .await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

/// Initialize tracing/logging. Output goes to stderr; stdout carries the
/// generated response.
fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("decoy=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
