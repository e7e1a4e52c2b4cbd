//! `decoy respond` — run one captured request through the configured model.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{info, warn};

use decoy_core::config::load_config;
use decoy_core::{CallContext, HttpRequest};
use decoy_providers::{initialize, with_env_credentials};
use decoy_responder::Responder;

/// Options for one `respond` invocation.
pub struct RespondArgs {
    pub request: Option<PathBuf>,
    pub json: bool,
    pub config: Option<PathBuf>,
    pub timeout: Option<u64>,
}

pub async fn run(args: RespondArgs) -> Result<()> {
    let config = load_config(args.config.as_deref());
    let llm = with_env_credentials(config.llm.clone());

    let raw = read_input(args.request.as_ref())?;
    let request = parse_request(&raw, args.json)?;

    let client = initialize(&llm).context("failed to initialize LLM client")?;
    let responder = Responder::new(client, &config.prompts, llm.temperature)
        .context("invalid prompt configuration")?;

    let mut ctx = CallContext::background();
    if let Some(secs) = args.timeout {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }
    let (ctx, cancel) = ctx.cancellable();

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            cancel.cancel();
        }
    });

    info!(
        provider = %responder.client().display_name(),
        model = responder.client().model(),
        method = %request.method,
        uri = %request.uri,
        "generating response"
    );
    let result = responder.respond(&request, &ctx).await;
    ctrl_c.abort();

    match result {
        Ok(response) => {
            let out = serde_json::to_string_pretty(&response)
                .context("failed to serialize response")?;
            println!("{out}");
            Ok(())
        }
        Err(e) => {
            warn!(
                error = %e,
                retryable = e.is_retryable(),
                cancelled = ctx.is_cancelled(),
                "generation failed"
            );
            if let Some(cleaned) = e.cleaned_response() {
                eprintln!("{}", "Model output:".yellow().bold());
                eprintln!("{cleaned}");
            }
            Err(anyhow::Error::new(e).context("failed to generate response"))
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read request from {}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read request from stdin")?;
            Ok(buf)
        }
    }
}

/// Decode the captured request, raw HTTP or its JSON form.
fn parse_request(raw: &[u8], json: bool) -> Result<HttpRequest> {
    if json {
        serde_json::from_slice(raw).context("request is not a valid JSON HttpRequest")
    } else {
        HttpRequest::parse(raw).context("request is not valid raw HTTP")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_raw_request() {
        let req = parse_request(b"GET /wp-login.php HTTP/1.1\r\nHost: blog\r\n\r\n", false).unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.uri, "/wp-login.php");
        assert_eq!(req.host.as_deref(), Some("blog"));
    }

    #[test]
    fn parse_json_request() {
        let req = parse_request(br#"{"method":"POST","uri":"/api","body":[104,105]}"#, true).unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.body, b"hi");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_request(b"hello", false).is_err());
        assert!(parse_request(b"hello", true).is_err());
    }

    #[test]
    fn read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.http");
        std::fs::write(&path, "HEAD / HTTP/1.0\n\n").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), b"HEAD / HTTP/1.0\n\n");
    }

    #[test]
    fn read_input_missing_file() {
        let err = read_input(Some(&PathBuf::from("/nonexistent/req.http"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/req.http"));
    }
}
