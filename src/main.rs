//! Tether main entry point
//!
//! This is the command-line interface for the Tether broken-link checker.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tether::config::{load_config_with_hash, Config};
use tether::output::{print_report, render_json};
use tether::Crawler;
use tracing_subscriber::EnvFilter;

/// Tether: a concurrent broken-link checker
///
/// Tether checks every link reachable from a root URL, follows links that stay
/// on the root's domain, and reports the ones that are broken.
///
/// Exits with 0 when no broken link was found, 1 when at least one was, and 2
/// when the crawl could not run.
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(version)]
#[command(about = "A concurrent broken-link checker", long_about = None)]
struct Cli {
    /// URL to start crawling from (a missing scheme means https://)
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the full result as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tether=info,warn"),
            1 => EnvFilter::new("tether=debug,info"),
            2 => EnvFilter::new("tether=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs the crawl and prints its result
///
/// Returns whether the site is free of broken links.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = match &cli.config {
        Some(path) => load_configuration(path)?,
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let crawler = Crawler::new(config).context("Failed to set up crawler")?;
    let result = crawler.crawl(&cli.root_url).await?;

    if cli.json {
        println!("{}", render_json(&result)?);
    } else {
        print_report(&result);
    }

    Ok(result.is_clean())
}

fn load_configuration(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}
