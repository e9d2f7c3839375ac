//! Sync job
//!
//! Glue between the binary and the engine: obtain the dataset, pick the
//! store, run the pass, record the run. Dry runs never create or modify the
//! database file.

use crate::client::TripSitClient;
use crate::engine::{reconcile, ReconciliationReport};
use crate::error::SyncError;
use crate::source::SourceDataset;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use subcat_common::db::{connect_readonly, load_all_substances, save_sync_run, SyncRun};
use subcat_common::store::{MemoryRecordStore, SqliteRecordStore};
use tracing::info;
use uuid::Uuid;

/// Where the secondary dataset comes from
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Remote { url: String, timeout_secs: u64 },
    File(PathBuf),
}

impl DatasetSource {
    /// Label stored with the sync run
    pub fn label(&self) -> String {
        match self {
            DatasetSource::Remote { url, .. } => url.clone(),
            DatasetSource::File(path) => format!("file://{}", path.display()),
        }
    }

    pub async fn load(&self) -> Result<SourceDataset, SyncError> {
        match self {
            DatasetSource::Remote { url, timeout_secs } => {
                TripSitClient::new(url.clone(), *timeout_secs)?.fetch_dataset().await
            }
            DatasetSource::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                SourceDataset::from_slice(&bytes)
            }
        }
    }
}

/// Open the catalog for a dry run without creating or migrating anything
///
/// An existing database is opened read-only. A missing one yields `None`
/// and the dry run starts from an empty catalog.
pub async fn open_for_dry_run(db_path: &Path) -> Result<Option<SqlitePool>, SyncError> {
    if !db_path.exists() {
        info!("No database at {}, dry run starts from an empty catalog", db_path.display());
        return Ok(None);
    }

    Ok(Some(connect_readonly(db_path).await?))
}

/// Reconcile `dataset` against an in-memory copy of the catalog
///
/// Nothing is written and no sync run is recorded.
pub async fn run_dry(pool: Option<&SqlitePool>, dataset: &SourceDataset) -> Result<ReconciliationReport, SyncError> {
    let existing = match pool {
        Some(pool) => load_all_substances(pool).await?,
        None => Vec::new(),
    };

    let store = MemoryRecordStore::with_records(existing);
    info!(records = store.len().await, "Dry run against in-memory copy of catalog");

    Ok(reconcile(&store, dataset).await)
}

/// Reconcile `dataset` into the database and record the run
pub async fn run_sync(
    pool: &SqlitePool,
    dataset: &SourceDataset,
    source_label: &str,
) -> Result<ReconciliationReport, SyncError> {
    let store = SqliteRecordStore::new(pool.clone());
    let report = reconcile(&store, dataset).await;

    save_sync_run(
        pool,
        &SyncRun {
            guid: Uuid::new_v4(),
            source: source_label.to_string(),
            started_at: report.started_at,
            finished_at: report.finished_at,
            created: report.created as i64,
            updated: report.updated as i64,
            unchanged: report.unchanged as i64,
            skipped: report.skipped as i64,
            failed: report.failures.len() as i64,
        },
    )
    .await?;

    Ok(report)
}
