//! `refetch get <url>` – fetch JSON with bounded retry and print it.

use anyhow::{Context, Result};
use clap::Args;
use refetch_core::cancel::CancelToken;
use refetch_core::config::RefetchConfig;
use refetch_core::fetch::{CurlFetcher, CurlOptions};
use refetch_core::retry::{fetch_value, RetryMode, RetryRequest};
use std::time::Duration;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Direct HTTP/HTTPS URL returning JSON.
    #[arg(value_parser = parse_http_url)]
    pub url: String,

    /// Maximum number of attempts, including the first (overrides config).
    #[arg(long, short = 'n', value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: Option<u32>,

    /// Base backoff delay between attempts in milliseconds; doubles each retry (overrides config).
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Time limit per attempt in seconds (overrides config).
    #[arg(long, value_name = "S", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Only retry timeouts, connection failures, 408/429 and 5xx.
    #[arg(long)]
    pub transient_only: bool,

    /// Extra request header, e.g. -H 'Accept: application/json'. Repeatable.
    #[arg(long = "header", short = 'H', value_name = "NAME: VALUE")]
    pub headers: Vec<String>,
}

/// Accept only absolute http/https URLs.
fn parse_http_url(s: &str) -> Result<String, String> {
    let url = url::Url::parse(s).map_err(|e| format!("invalid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => Ok(s.to_string()),
        other => Err(format!("unsupported scheme '{}', expected http or https", other)),
    }
}

/// Split a "Name: value" header argument.
pub(crate) fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("header '{}' is not 'Name: value'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("header '{}' has an empty name", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Merge config with flag overrides. Flags win; `-H` adds a header or replaces
/// a config header with the same name.
pub(crate) fn build_request(
    cfg: &RefetchConfig,
    args: &GetArgs,
) -> Result<(RetryRequest, CurlOptions)> {
    let mut policy = cfg.retry_policy()?;
    if let Some(n) = args.retries {
        policy.max_attempts = n;
    }
    if let Some(ms) = args.delay_ms {
        policy.base_delay = Duration::from_millis(ms);
    }
    if args.transient_only {
        policy.mode = RetryMode::Transient;
    }

    let mut curl = cfg.curl_options()?;
    if let Some(secs) = args.timeout_secs {
        curl.attempt_timeout = Duration::from_secs(secs);
    }
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        curl.headers.insert(name, value);
    }
    curl.validate()?;

    let request = RetryRequest::with_policy(args.url.clone(), policy)?;
    Ok((request, curl))
}

/// Runs the request with Ctrl-C wired to cancellation and prints the payload as pretty JSON.
pub async fn run_get(cfg: &RefetchConfig, args: GetArgs) -> Result<()> {
    let (request, curl) = build_request(cfg, &args)?;
    let fetcher = CurlFetcher::new(curl)?;
    let cancel = CancelToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling");
                cancel.cancel();
            }
        })
    };

    let result = fetch_value(&fetcher, &request, &cancel).await;
    ctrl_c.abort();
    let value = result.with_context(|| format!("GET {}", args.url))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
