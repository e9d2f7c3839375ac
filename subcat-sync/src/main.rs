//! subcat-sync - Secondary-source reconciliation job
//!
//! One-shot batch job, meant to be run on a schedule. Fetches the TripSit
//! dataset, fills gaps in the canonical catalog, and exits.
//!
//! Exit status: 0 on success, 1 on a fatal failure (dataset unavailable,
//! database unusable), 2 when the pass finished but some entries failed to
//! write.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use subcat_common::config::{resolve_config_path, resolve_database_path, TomlConfig};
use subcat_common::db::init_database;
use subcat_sync::job::{open_for_dry_run, run_dry, run_sync, DatasetSource};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "subcat-sync", version, about = "Reconcile the TripSit dataset into the substance catalog")]
struct Args {
    /// Path to TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Dataset URL (overrides config)
    #[arg(long, env = "SUBCAT_SOURCE_URL")]
    source_url: Option<String>,

    /// Read the dataset from a local JSON file instead of fetching it
    #[arg(long, conflicts_with = "source_url")]
    dataset: Option<PathBuf>,

    /// Fetch timeout in seconds (overrides config)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Run the pass without writing to the database
    #[arg(long)]
    dry_run: bool,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = TomlConfig::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting subcat-sync v{}", env!("CARGO_PKG_VERSION"));
    if !config_path.exists() {
        warn!("Config file not found at {}, using defaults", config_path.display());
    }

    let source = match args.dataset {
        Some(path) => DatasetSource::File(path),
        None => DatasetSource::Remote {
            url: args.source_url.unwrap_or_else(|| config.sync.source_url.clone()),
            timeout_secs: args.timeout_secs.unwrap_or(config.sync.timeout_secs),
        },
    };
    info!("Dataset source: {}", source.label());

    // Nothing touches the database until the dataset is loaded
    let dataset = match source.load().await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Sync aborted, could not load dataset: {}", e);
            return Err(e.into());
        }
    };

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database: {}", db_path.display());

    let (pool, report) = if args.dry_run {
        let pool = open_for_dry_run(&db_path)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        let report = run_dry(pool.as_ref(), &dataset).await?;
        (pool, report)
    } else {
        let pool = init_database(&db_path)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        let report = run_sync(&pool, &dataset, &source.label()).await?;
        (Some(pool), report)
    };

    info!(
        "Sync complete: created {}, updated {}, unchanged {}, skipped {}, failed {}",
        report.created,
        report.updated,
        report.unchanged,
        report.skipped,
        report.failures.len()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.has_failures() {
        for failure in &report.failures {
            warn!("Write failed for '{}': {}", failure.name, failure.message);
        }
        if let Some(pool) = pool {
            pool.close().await;
        }
        std::process::exit(2);
    }

    Ok(())
}
