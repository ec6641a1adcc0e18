mod collector;
mod config;
mod extractor;
mod http_client;
mod models;
mod output;
mod pacing;
mod scraper_trait;
mod scrapers;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use collector::Collector;
use config::{Config, RunPlan};
use pacing::JitteredDelay;
use scrapers::AruodasScraper;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "aruodas-scraper")]
#[command(about = "Collects real-estate listings from aruodas.lt into a JSON file", long_about = None)]
struct Args {
    /// Output JSON file
    #[arg(long, required_unless_present = "test_url")]
    output: Option<PathBuf>,

    /// Comma-separated list of cities (default: Vilnius, Kaunas, Klaipėda, Šiauliai, Panevėžys)
    #[arg(long)]
    city: Option<String>,

    /// Comma-separated property types: flat, house, land, commercial, cottage
    #[arg(long)]
    property_type: Option<String>,

    /// Number of result pages per city and property type
    #[arg(long, default_value_t = 3)]
    pages: u32,

    /// Base delay between requests, in seconds
    #[arg(long, default_value = "1", value_parser = parse_delay)]
    delay: Duration,

    /// YAML file with scraper settings (default: data/config.yaml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fetch a single results page and print the extracted listings
    #[arg(long)]
    test_url: Option<String>,

    /// Save the fetched HTML to a file when using --test-url
    #[arg(long, requires = "test_url")]
    save_html: Option<PathBuf>,
}

fn parse_delay(raw: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("delay must be a non-negative number of seconds, got {}", raw));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("delay {} is out of range: {}", raw, e))
}

fn init_tracing(configured_level: &str) {
    // Logs go to stderr so that --test-url output on stdout stays valid JSON
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("Logging level set from RUST_LOG environment variable");
        return;
    }

    let level = configured_level.to_lowercase();
    let max_level = match level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Invalid tracing level '{}', using 'info'", level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load config first (before logging is initialized)
    let config = Config::load(args.config.as_deref())?;
    init_tracing(&config.tracing_level);

    if let Some(url) = args.test_url.as_deref() {
        return test_url_fetch(url, args.save_html.as_deref(), &config).await;
    }

    // Resolve and validate the work list before any network activity
    let plan = match RunPlan::resolve(
        args.city.as_deref(),
        args.property_type.as_deref(),
        args.pages,
        args.delay,
        &config,
    ) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let output = args.output.context("--output is required")?;

    tracing::info!("Cities: {:?}", plan.cities);
    tracing::info!(
        "Property types: {}",
        plan.property_types.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
    );
    tracing::info!("Pages per city and type: {}, delay: {:.2}s", plan.pages, plan.delay.as_secs_f64());

    let scraper = AruodasScraper::new(&config)?;
    let pacer = JitteredDelay::new(plan.delay, config.max_jitter());
    let collection = Collector::new(&scraper, &pacer).collect(&plan).await;

    output::write_listings(&output, &collection.listings)?;

    tracing::info!(
        "Scraping finished. Collected {} listings in total ({} of {} pages failed).",
        collection.listings.len(),
        collection.stats.pages_failed,
        collection.stats.pages_requested
    );
    tracing::info!("Results saved to: {}", output.display());

    Ok(())
}

/// Fetch one URL, optionally save its HTML, and print what the extractor finds
async fn test_url_fetch(url: &str, save_path: Option<&Path>, config: &Config) -> Result<()> {
    tracing::info!("Testing URL fetch: {}", url);

    let scraper = AruodasScraper::new(config)?;
    let html = scraper.fetch_html(url).await?;

    if let Some(path) = save_path {
        std::fs::write(path, &html)
            .with_context(|| format!("Failed to save HTML to {}", path.display()))?;
        tracing::info!("HTML saved to: {}", path.display());
    }

    let listings = scraper.extract(&html);
    tracing::info!("Extracted {} listings", listings.len());

    if listings.is_empty() {
        tracing::warn!("No listings found. The selectors may need updating or the page structure has changed.");
    }

    println!("{}", serde_json::to_string_pretty(&listings)?);

    Ok(())
}
