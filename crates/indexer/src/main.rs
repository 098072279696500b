//! noderewards - last reward claim per node from a contract's history
//!
//! This binary provides:
//! - Fetching the node contract's transaction history from a block explorer
//! - Offline reconciliation of a saved history
//! - Per-node reports (pretty or JSON) with run totals

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use noderewards_indexer::config::{Config, LoggingConfig};
use noderewards_indexer::report::{parse_utc_offset, ReportFormat, RunReport};
use noderewards_indexer::source::{load_snapshot, save_snapshot, ExplorerClient};
use noderewards_indexer::{Selectors, Transaction};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "noderewards")]
#[command(version, about = "Reconstructs the last reward claim of every node", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "noderewards.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Override the configured report format (pretty or json)
    #[arg(short, long)]
    format: Option<ReportFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the history from the explorer and reconcile it
    Fetch,

    /// Reconcile a saved history (explorer response or record array)
    Reconcile {
        /// Snapshot file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Fetch the history and save it for offline runs
    Dump {
        /// Snapshot file to write
        #[arg(short, long, default_value = "history.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging settings come from the config, so load it before anything logs.
    let config = load_config(&cli.config);
    let logging = match &config {
        Ok(Some(config)) => config.logging.clone(),
        _ => LoggingConfig::default(),
    };
    init_logging(cli.debug, &logging)?;

    info!("noderewards {}", env!("CARGO_PKG_VERSION"));
    let config = config?;

    match cli.command {
        Commands::Fetch => {
            let config = require_config(config, &cli.config)?;
            let transactions = fetch(&config).await?;
            reconcile(&transactions, &config.selectors, Some(&config), cli.format)?;
        }
        Commands::Reconcile { input } => {
            let transactions = load_snapshot(&input)?;
            let selectors = config.as_ref().map(|c| c.selectors).unwrap_or_default();
            reconcile(&transactions, &selectors, config.as_ref(), cli.format)?;
        }
        Commands::Dump { output } => {
            let config = require_config(config, &cli.config)?;
            let transactions = fetch(&config).await?;
            save_snapshot(&output, &transactions)?;
        }
    }

    Ok(())
}

/// Initialize tracing subscriber for logging (to stderr; stdout carries the report)
fn init_logging(debug: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let crates = [
        "noderewards",
        "noderewards_indexer",
        "noderewards_engine",
        "noderewards_core",
    ];
    let level = if debug { "debug" } else { logging.level.as_str() };
    let directives = crates
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = if debug {
        EnvFilter::new(directives)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}

/// Load the config file; a missing file is not an error.
fn load_config(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    Config::from_file(path)
        .map(Some)
        .context("Failed to load configuration")
}

fn require_config(config: Option<Config>, path: &Path) -> Result<Config> {
    config.with_context(|| {
        format!(
            "Configuration file {} not found (required to reach the explorer)",
            path.display()
        )
    })
}

async fn fetch(config: &Config) -> Result<Vec<Transaction>> {
    info!("  Explorer: {}", config.explorer.api_url);
    info!("  Contract: {:#x}", config.explorer.contract);

    let client = ExplorerClient::new(&config.explorer)?;
    client
        .fetch_all()
        .await
        .context("Failed to fetch transaction history")
}

fn reconcile(
    transactions: &[Transaction],
    selectors: &Selectors,
    config: Option<&Config>,
    format_override: Option<ReportFormat>,
) -> Result<()> {
    let report_config = config.map(|c| c.report.clone()).unwrap_or_default();
    let offset = parse_utc_offset(&report_config.utc_offset)?;
    let format = format_override.unwrap_or(report_config.format);

    let report = noderewards_indexer::run(transactions, selectors)
        .context("Nothing to reconcile")?;
    if report.summary.decode_failures > 0 {
        warn!(
            "{} transactions could not be decoded and were excluded",
            report.summary.decode_failures
        );
    }

    let rendered = RunReport::new(&report, &offset).render(format)?;
    println!("{}", rendered);

    Ok(())
}
