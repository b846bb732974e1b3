//! pricewatch-scraper command-line entry point
//!
//! Runs the scraping engine against live storefronts and prints results as
//! JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pricewatch_scraper::config::ScraperConfigBuilder;
use pricewatch_scraper::{Currency, Orchestrator, Product, ScraperConfig, parse_price, resolve_rulesets};

/// Multi-storefront product search and price tracking
#[derive(Parser, Debug)]
#[command(name = "pricewatch-scraper")]
#[command(version)]
#[command(about = "Scrape product listings and prices from several storefronts", long_about = None)]
struct Cli {
    /// JSON configuration file; missing keys take their defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory of *.json rulesets overriding or extending the built-ins
    #[arg(long, global = true, value_name = "DIR")]
    rules_dir: Option<PathBuf>,

    /// Show the browser window (needed to clear a challenge by hand)
    #[arg(long, global = true)]
    headful: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every source for QUERY
    Search {
        query: String,
    },
    /// Scrape a single listing page, reviews included
    Details {
        url: String,
        /// Source id the listing belongs to
        #[arg(long)]
        source: String,
    },
    /// Re-derive the current price of a product previously printed by `search`
    Refresh {
        /// File holding one product as JSON
        #[arg(value_name = "PRODUCT_JSON")]
        product: PathBuf,
    },
    /// List the registered source ids
    Sources,
    /// Normalize a price string without touching the network
    ParsePrice {
        text: String,
        /// Currency assumed when the text carries no marker
        #[arg(long, default_value = "USD")]
        currency: Currency,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = load_config(&cli)?;

    match cli.command {
        Command::Search { query } => {
            let orchestrator = Orchestrator::from_config(config)?;
            let products = orchestrator.search_all_sources(&query).await;
            print_json(&products)?;
        }
        Command::Details { url, source } => {
            let orchestrator = Orchestrator::from_config(config)?;
            let product = orchestrator.get_product_details(&url, &source).await?;
            print_json(&product)?;
        }
        Command::Refresh { product } => {
            let raw = std::fs::read_to_string(&product)
                .with_context(|| format!("Failed to read {}", product.display()))?;
            let existing: Product = serde_json::from_str(&raw)
                .with_context(|| format!("{} does not hold a product", product.display()))?;
            let orchestrator = Orchestrator::from_config(config)?;
            let update = orchestrator.refresh_price(&existing).await?;
            print_json(&update)?;
        }
        Command::Sources => {
            let sources: Vec<serde_json::Value> = resolve_rulesets(&config)?
                .into_iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id,
                        "display_name": r.display_name,
                        "base_url": r.base_url,
                        "default_currency": r.default_currency,
                    })
                })
                .collect();
            print_json(&sources)?;
        }
        Command::ParsePrice { text, currency } => {
            print_json(&parse_price(&text, currency))?;
        }
    }

    Ok(())
}

fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("pricewatch_scraper=info,warn"),
        1 => EnvFilter::new("pricewatch_scraper=debug,info"),
        2 => EnvFilter::new("pricewatch_scraper=trace,debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(cli: &Cli) -> Result<ScraperConfig> {
    let base = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            ScraperConfig::from_json_file(path)?
        }
        None => ScraperConfig::default(),
    };

    let mut builder = ScraperConfigBuilder::from(base);
    if cli.rules_dir.is_some() {
        builder = builder.rules_dir(cli.rules_dir.clone());
    }
    if cli.headful {
        builder = builder.headless(false);
    }
    Ok(builder.build()?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
