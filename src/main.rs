// src/main.rs
// =============================================================================
// This is the entry point of the linkgate CLI.
//
// What happens here:
// 1. Install the tracing subscriber (diagnostics go to stderr)
// 2. Parse command-line arguments using clap and load the config
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = problems found, 2 = error)
// =============================================================================

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use futures::stream::{self, StreamExt};
use linkgate::mediator::{self, Page, RedirectParams, SweepReport};
use linkgate::status::{self, FetchOutcome, Severity, StatusInfo};
use linkgate::HostConfig;
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins; otherwise our own crate logs at info
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linkgate=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = HostConfig::load(cli.config.as_deref()).context("could not load configuration")?;

    match cli.command {
        Commands::Scan { inputs, json } => handle_scan(&config, inputs, json).await,
        Commands::Mediate { url } => handle_mediate(&config, &url),
        Commands::Decode { token } => handle_decode(&config, &token),
        Commands::Status { links, json } => handle_status(&config, &links, json).await,
    }
}

// -----------------------------------------------------------------------------
// scan
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct PageReport {
    input: String,
    #[serde(flatten)]
    report: SweepReport,
}

async fn handle_scan(config: &HostConfig, inputs: Vec<String>, json: bool) -> Result<i32> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.status.request_timeout_secs))
        .build()
        .context("failed to create HTTP client")?;

    // Load pages concurrently but keep the order they were given in
    let loaded: Vec<(String, Result<Page>)> = stream::iter(inputs)
        .map(|input| {
            let client = client.clone();
            async move {
                let page = load_page(&client, &input).await;
                (input, page)
            }
        })
        .buffered(8)
        .collect()
        .await;

    let mut reports = Vec::new();
    let mut failures = 0;

    for (input, page) in loaded {
        match page {
            Ok(mut page) => {
                let report = mediator::sweep(&mut page, &config.mediation);
                reports.push(PageReport { input, report });
            }
            Err(e) => {
                tracing::warn!(input = %input, error = %e, "could not load page");
                failures += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_scan_table(&reports);
    }

    if failures > 0 {
        Ok(2)
    } else {
        Ok(0)
    }
}

async fn load_page(client: &Client, input: &str) -> Result<Page> {
    if input.starts_with("http://") || input.starts_with("https://") {
        let response = client.get(input).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP {}", response.status()));
        }
        let html = response.text().await?;
        return Ok(Page::from_html(&html));
    }

    let path = Path::new(input);
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_markdown = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    );

    if is_markdown {
        Ok(Page::from_markdown(&contents))
    } else {
        Ok(Page::from_html(&contents))
    }
}

fn print_scan_table(reports: &[PageReport]) {
    for page in reports {
        println!("📄 {}", page.input);
        println!(
            "   {} anchor(s), {} rewritten, {} ignored, {} without href",
            page.report.visited,
            page.report.rewritten.len(),
            page.report.ignored,
            page.report.without_href
        );

        for rewrite in &page.report.rewritten {
            println!("   🔀 {} -> {}", truncate(&rewrite.original, 57), rewrite.mediated);
        }
        println!();
    }
}

// -----------------------------------------------------------------------------
// mediate / decode
// -----------------------------------------------------------------------------

fn handle_mediate(config: &HostConfig, url: &str) -> Result<i32> {
    let class = mediator::classify(url, &config.mediation.trusted_domains);
    let mediated = mediator::mediate(url, &config.mediation);

    tracing::debug!(?class, "classified link");
    println!("{}", mediated);
    Ok(0)
}

fn handle_decode(config: &HostConfig, token: &str) -> Result<i32> {
    // Accept a whole "/go?u=..." href as well as a bare token
    if token.contains('?') {
        let params = RedirectParams::from_href(token, &config.mediation)?
            .ok_or_else(|| anyhow!("'{}' is not a link to the redirect page", token))?;
        println!("{}", params.target);
        println!(
            "countdown: {}s, dark mode: {:?}",
            params.countdown_seconds, params.dark_mode
        );
        return Ok(0);
    }

    let url = mediator::decode(token)?;
    println!("{}", url);
    Ok(0)
}

// -----------------------------------------------------------------------------
// status
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct StatusRow {
    link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<StatusInfo>,
}

async fn handle_status(config: &HostConfig, links: &[String], json: bool) -> Result<i32> {
    let cache = status::from_config(&config.status)?;

    match cache.ensure_fresh().await {
        FetchOutcome::Fetched => tracing::info!("status data refreshed"),
        FetchOutcome::CacheHit => tracing::info!("status data served from cache"),
        FetchOutcome::Failed(message) => eprintln!("⚠️  Could not fetch status data: {}", message),
        FetchOutcome::Coalesced => {}
    }

    let snapshot = match cache.snapshot() {
        Some(snapshot) => snapshot,
        None => {
            eprintln!("⚠️  No status data available");
            return Ok(1);
        }
    };

    let wanted: Vec<String> = if links.is_empty() {
        snapshot.link_status.iter().map(|s| s.link.clone()).collect()
    } else {
        links.to_vec()
    };

    let rows: Vec<StatusRow> = wanted
        .into_iter()
        .map(|link| {
            let found = cache.lookup(&link);
            StatusRow {
                latency: found.as_ref().map(|s| s.latency),
                info: found.as_ref().map(status::classify),
                link,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_status_table(&rows);
    }

    let unhealthy = rows
        .iter()
        .filter(|row| !row.info.as_ref().map(|i| i.severity.is_reachable()).unwrap_or(false))
        .count();

    if unhealthy > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn print_status_table(rows: &[StatusRow]) {
    println!("{:<60} {:<12} {:<12}", "LINK", "LATENCY", "STATUS");
    println!("{}", "=".repeat(84));

    for row in rows {
        let (text, label) = match &row.info {
            Some(info) => (info.text.clone(), format_severity(info.severity)),
            None => ("-".to_string(), "❔ NOT LISTED".to_string()),
        };
        println!("{:<60} {:<12} {:<12}", truncate(&row.link, 57), text, label);
    }

    println!();

    let good = rows
        .iter()
        .filter(|r| matches!(r.info.as_ref().map(|i| i.severity), Some(Severity::Good)))
        .count();

    println!("📊 Summary:");
    println!("   ✅ Good: {}", good);
    println!("   📋 Total: {}", rows.len());
}

fn format_severity(severity: Severity) -> String {
    match severity {
        Severity::Good => "✅ GOOD".to_string(),
        Severity::Fair => "🟡 FAIR".to_string(),
        Severity::Poor => "🟠 POOR".to_string(),
        Severity::Bad => "❌ BAD".to_string(),
        Severity::Unknown => "⚠️  UNKNOWN".to_string(),
    }
}

// Truncates on a char boundary so multi-byte URLs don't panic
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
