//! paycoord - checkout payment request coordinator
//!
//! CLI entry point for exercising the coordinator against a live endpoint.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::{debug, info};

use paycoord::cli::{Cli, Command};
use paycoord::config::Config;
use paycoord::{
    CheckoutCoordinator, DedupStats, Fingerprint, HttpTransport, Method, PayloadShape, Prefetcher, RequestBody,
    RequestDeduplicator, RequestOptions, Response, SubmitOutcome, WatchList,
};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paycoord")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("paycoord.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(watch = ?config.dedup.watch, grace_window_ms = config.dedup.grace_window_ms, "paycoord loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Submit {
            url,
            body,
            method,
            repeat,
        } => cmd_submit(&config, &url, body.as_deref(), &method, repeat).await,
        Command::Pay { payload, repeat } => cmd_pay(&config, &payload, repeat).await,
        Command::Shape { payload } => cmd_shape(&config, &payload),
        Command::Fingerprint { url, body } => cmd_fingerprint(&config, &url, body.as_deref()),
        Command::Prefetch => cmd_prefetch(&config).await,
    }
}

fn parse_body(body: Option<&str>) -> Result<Option<RequestBody>> {
    body.map(|raw| {
        serde_json::from_str::<Value>(raw)
            .map(RequestBody::Json)
            .context("Body is not valid JSON")
    })
    .transpose()
}

fn read_payload(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    match serde_json::from_str::<Value>(&content).context("Payload is not valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => Err(eyre::eyre!("Payload must be a JSON object")),
    }
}

fn build_transport(config: &Config) -> Result<Arc<HttpTransport>> {
    let transport = HttpTransport::from_config(&config.http).context("Failed to build HTTP client")?;
    Ok(Arc::new(transport))
}

async fn cmd_submit(config: &Config, url: &str, body: Option<&str>, method: &str, repeat: usize) -> Result<()> {
    debug!(%url, %method, repeat, "cmd_submit: called");
    let method: Method = method.parse().map_err(|e: String| eyre::eyre!(e))?;
    let options = RequestOptions {
        method,
        body: parse_body(body)?,
        ..Default::default()
    };

    let dedup = RequestDeduplicator::from_config(build_transport(config)?, &config.dedup)?;
    let watched = dedup.is_watched(url);

    let outcomes = join_all((0..repeat.max(1)).map(|_| dedup.submit(url, options.clone()))).await;

    print_outcomes(&outcomes);
    println!(
        "{} {}",
        "URL:".bold(),
        if watched { "watched".green() } else { "not watched".yellow() }
    );
    print_stats(&dedup.stats());
    Ok(())
}

async fn cmd_pay(config: &Config, payload: &Path, repeat: usize) -> Result<()> {
    debug!(payload = %payload.display(), repeat, "cmd_pay: called");
    let payload = read_payload(payload)?;
    let coordinator = CheckoutCoordinator::new(config, build_transport(config)?)?;

    println!("{} {}", "Endpoint:".bold(), coordinator.payment_endpoint().cyan());
    let outcomes = join_all((0..repeat.max(1)).map(|_| coordinator.submit_payment(&payload))).await;

    print_outcomes(&outcomes);
    print_stats(&coordinator.stats());
    Ok(())
}

fn cmd_shape(config: &Config, payload: &Path) -> Result<()> {
    debug!(payload = %payload.display(), "cmd_shape: called");
    let payload = read_payload(payload)?;
    let shaped = PayloadShape::from_config(&config.payment).shape(&payload);
    println!("{}", serde_json::to_string_pretty(&Value::Object(shaped))?);
    Ok(())
}

fn cmd_fingerprint(config: &Config, url: &str, body: Option<&str>) -> Result<()> {
    debug!(%url, "cmd_fingerprint: called");
    let watch = WatchList::parse(&config.dedup.watch)?;
    let body = parse_body(body)?;
    let fingerprint = Fingerprint::new(url, body.as_ref())?;

    if watch.matches(url) {
        println!("{} {}", "✓".green(), "watched (deduplicated)".green());
    } else {
        println!("{} {}", "✗".yellow(), "not watched (pass-through)".yellow());
    }
    println!("{}", fingerprint);
    Ok(())
}

async fn cmd_prefetch(config: &Config) -> Result<()> {
    debug!("cmd_prefetch: called");
    let prefetcher = Prefetcher::new(build_transport(config)?, config.prefetch.resources.clone());
    let report = prefetcher.start().await.context("Prefetch task panicked")?;

    for url in &report.warmed {
        println!("{} {}", "✓".green(), url);
    }
    for url in &report.failed {
        println!("{} {}", "✗".red(), url);
    }
    Ok(())
}

/// Number of successful outcomes holding the same response as `resp`
fn share_count(outcomes: &[SubmitOutcome], resp: &Arc<Response>) -> usize {
    outcomes
        .iter()
        .filter_map(|o| o.as_ref().ok())
        .filter(|other| Arc::ptr_eq(other, resp))
        .count()
}

fn print_outcomes(outcomes: &[SubmitOutcome]) {
    for (i, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok(resp) => {
                let shared = share_count(outcomes, resp) > 1;
                let status = if resp.is_success() {
                    resp.status.to_string().green()
                } else {
                    resp.status.to_string().red()
                };
                println!(
                    "#{} {} {} bytes{}",
                    i + 1,
                    status,
                    resp.body.len(),
                    if shared { " (shared)".dimmed().to_string() } else { String::new() }
                );
            }
            Err(e) => println!("#{} {} {}", i + 1, "error".red(), e),
        }
    }
}

fn print_stats(stats: &DedupStats) {
    println!("{}", "Stats:".bold());
    println!("  Submissions:   {}", stats.submissions);
    println!("  Network calls: {}", stats.network_calls().to_string().cyan());
    println!("  Coalesced:     {}", stats.coalesced);
    println!("  Pass-through:  {}", stats.passthrough);
}
