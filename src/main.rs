//! Bulk Indexer main entry point
//!
//! This is the command-line interface for submitting stored URLs to the
//! Indexing API.

use anyhow::Context;
use bulk_indexer::config::{load_config_or_default, Config};
use bulk_indexer::indexing::IndexingClient;
use bulk_indexer::loader::load_urls_from_file;
use bulk_indexer::output::{load_statistics, print_statistics};
use bulk_indexer::storage::{open_storage, SqliteStorage, Storage};
use bulk_indexer::submitter::check_indexing;
use bulk_indexer::{BatchSubmitter, QuotaTracker};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Bulk Indexer: submit stored URLs to the Indexing API
///
/// URLs are loaded into a local database, then submitted in batches without
/// exceeding the daily quota. Every submission outcome is logged.
#[derive(Parser, Debug)]
#[command(name = "bulk-indexer")]
#[command(version)]
#[command(about = "Submit URLs to the Indexing API within the daily quota", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the indexing process
    Index,

    /// Load URLs from a given file to the DB, then empty the file
    Load {
        /// File with one URL per line
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Remove a URL from the DB
    Remove {
        /// Exact URL to remove
        url: String,
    },

    /// Report URLs due for an index status check
    Check,

    /// Show database statistics and today's quota
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    };

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match command {
        Command::Index => handle_index(&config).await?,
        Command::Load { file } => {
            let Some(file) = file else {
                println!("Please provide a file name to load URLs from.");
                std::process::exit(1);
            };
            handle_load(&config, &file)?;
        }
        Command::Remove { url } => handle_remove(&config, &url)?,
        Command::Check => handle_check(&config)?,
        Command::Stats => handle_stats(&config)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bulk_indexer=info,warn"),
            1 => EnvFilter::new("bulk_indexer=debug,info"),
            2 => EnvFilter::new("bulk_indexer=trace,debug"),
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

/// Opens the configured database
fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    open_storage(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Handles the `index` command: submits one batch
async fn handle_index(config: &Config) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;

    let api = IndexingClient::from_config(&config.indexing).with_context(|| {
        format!(
            "Failed to set up Indexing API client with {}",
            config.indexing.credentials_path
        )
    })?;

    let quota = QuotaTracker::new(config.quota.daily_limit);
    let batch_size = config.quota.batch_size as usize;

    let report = BatchSubmitter::new(&mut storage, &api, quota, batch_size)
        .submit_batch()
        .await
        .context("Indexing run failed")?;

    tracing::info!(
        "Run complete: {} loaded, {} queued, {} submitted, {} failed, {} quota left today",
        report.loaded,
        report.queued,
        report.submitted,
        report.failed,
        report.quota_remaining
    );

    Ok(())
}

/// Handles the `load` command: imports a seed file
fn handle_load(config: &Config, file: &Path) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;

    let report = load_urls_from_file(&mut storage, file)
        .with_context(|| format!("Failed to load URLs from {}", file.display()))?;

    tracing::info!("{} of {} URLs were new", report.added, report.read);
    println!("URLs loaded from {} into the database.", file.display());

    Ok(())
}

/// Handles the `remove` command
fn handle_remove(config: &Config, url: &str) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;

    if storage.remove_url(url)? == 0 {
        println!("{} is not in the database.", url);
    } else {
        println!("Removed {} from the database.", url);
    }

    Ok(())
}

/// Handles the `check` command
fn handle_check(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;

    let due = check_indexing(&storage, config.quota.recheck_after_days)?;
    println!("{} URLs are due for an index status check.", due);

    Ok(())
}

/// Handles the `stats` command
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;

    println!("Database: {}\n", config.storage.database_path);

    let quota = QuotaTracker::new(config.quota.daily_limit);
    let stats = load_statistics(&mut storage, &quota)?;
    print_statistics(&stats);

    Ok(())
}
