//! Contact-Sweep main entry point
//!
//! This is the command-line interface for the Contact-Sweep contact harvester.

use anyhow::Context;
use clap::Parser;
use contact_sweep::config::{load_config_with_hash, Config};
use contact_sweep::crawler::{spawn_interrupt_handler, sweep};
use contact_sweep::output::print_summary;
use contact_sweep::records::read_roster;
use contact_sweep::url::ensure_scheme;
use contact_sweep::RoutePolicy;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Contact-Sweep: a business contact harvester
///
/// Contact-Sweep visits every website of a domain roster, collects phone
/// numbers, social-media links and physical addresses, and writes them back
/// into the roster dataset.
#[derive(Parser, Debug)]
#[command(name = "contact-sweep")]
#[command(version)]
#[command(about = "A business contact harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_sweep(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("contact_sweep=info,warn"),
            1 => EnvFilter::new("contact_sweep=debug,info"),
            2 => EnvFilter::new("contact_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let roster_path = Path::new(&config.input.roster_path);
    let roster = read_roster(roster_path)
        .with_context(|| format!("Failed to read roster {}", roster_path.display()))?;
    let policy = RoutePolicy::from_config(&config.crawler, &config.routes);

    println!("=== Contact-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent domains: {}",
        config.crawler.max_concurrent_domains
    );
    println!("  Route policy: {}", policy.name());
    println!("  Default scheme: {}", config.crawler.default_scheme);
    println!("  Page timeout: {}s", config.crawler.page_timeout_secs);
    println!("  Domain timeout: {}s", config.crawler.domain_timeout_secs);
    println!(
        "  Max pages per domain: {}",
        config.crawler.max_pages_per_domain
    );
    println!("  Phone discovery: {:?}", config.crawler.phone_discovery);
    println!("  Phone dedup: {:?}", config.crawler.phone_dedup);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nFiles:");
    println!("  Roster: {}", config.input.roster_path);
    println!("  Dataset: {}", config.output.dataset_path);

    println!("\nDomains ({}):", roster.len());
    for record in &roster.records {
        println!(
            "  - {}",
            ensure_scheme(&record.domain, &config.crawler.default_scheme)
        );
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} domain(s)", roster.len());

    Ok(())
}

/// Handles the main sweep operation
async fn handle_sweep(config: &Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let interrupt = spawn_interrupt_handler(cancel.clone());

    let result = sweep(config, cancel.clone()).await;

    // Stop the interrupt listener
    cancel.cancel();
    let _ = interrupt.await;

    let report = result.context("Sweep failed")?;
    print_summary(&report);

    tracing::info!("Dataset written to {}", config.output.dataset_path);
    Ok(())
}
