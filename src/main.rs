//! catalog-crawler main entry point
//!
//! This is the command-line interface for the bounded catalog crawler.

use anyhow::Context;
use catalog_crawler::config::{load_config_with_hash, validate, Config, PolicyVariant};
use catalog_crawler::crawler::crawl;
use catalog_crawler::output::{print_statistics, sink_for, CrawlStatistics};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// catalog-crawler: a bounded, polite catalog crawler
///
/// Crawls one site from a seed URL, visiting item pages before anything
/// else, and writes the records it extracts to the console or a JSON-lines
/// file depending on the policy.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version)]
#[command(about = "A bounded catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl policy: minimal or extended
    #[arg(long, value_name = "POLICY")]
    policy: Option<PolicyVariant>,

    /// Maximum number of pages to visit
    #[arg(long, value_name = "N")]
    max_visits: Option<u32>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// JSON-lines output path (extended policy)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Standard output carries records under the minimal policy
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(policy) = cli.policy {
        config.crawler.policy = policy;
    }
    if let Some(max_visits) = cli.max_visits {
        config.crawler.max_visits = max_visits;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved configuration
fn print_dry_run(config: &Config) {
    println!("=== catalog-crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Site scope: {}", config.crawler.site_scope);
    println!("  Item pattern: {}", config.crawler.item_pattern);
    if let Some(listing) = &config.crawler.listing_pattern {
        println!("  Listing pattern: {}", listing);
    }
    println!("  Policy: {:?}", config.crawler.policy);
    println!("  Max visits: {}", config.crawler.max_visits);
    println!("  Workers: {}", config.crawler.workers);
    println!(
        "  Politeness delay: {}ms",
        config.crawler.politeness_delay_ms
    );

    println!("\nFetching:");
    println!("  Max attempts: {}", config.fetch.max_retries);
    println!("  Retry delay: {}ms", config.fetch.retry_delay_ms);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Non-2xx status: {:?}", config.fetch.status_policy);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Format: {:?}", config.crawler.policy.output_format());
    println!("  Path: {}", config.output.path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping crawl and keeping collected records");
            interrupt.cancel();
        }
    });

    let report = match crawl(&config, cancel).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let mut sink = sink_for(&config);
    sink.write_records(&report.records)
        .context("failed to write records")?;

    print_statistics(&CrawlStatistics::from_report(&report));
    Ok(())
}
