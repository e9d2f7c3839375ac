//! Sync run history
//!
//! One row per finished reconciliation pass, so operators can see what the
//! last scheduled run did without digging through logs.

use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Persisted summary of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncRun {
    pub guid: Uuid,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub created: i64,
    pub updated: i64,
    pub unchanged: i64,
    pub skipped: i64,
    pub failed: i64,
}

/// Save a sync run
pub async fn save_sync_run(pool: &SqlitePool, run: &SyncRun) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sync_runs (
            guid, source, started_at, finished_at, created, updated, unchanged, skipped, failed
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(run.guid.to_string())
    .bind(&run.source)
    .bind(run.started_at)
    .bind(run.finished_at)
    .bind(run.created)
    .bind(run.updated)
    .bind(run.unchanged)
    .bind(run.skipped)
    .bind(run.failed)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the most recently finished sync run
pub async fn load_latest_sync_run(pool: &SqlitePool) -> Result<Option<SyncRun>> {
    let row = sqlx::query(
        r#"
        SELECT guid, source, started_at, finished_at, created, updated, unchanged, skipped, failed
        FROM sync_runs
        ORDER BY finished_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.try_get("guid")?;

            Ok(Some(SyncRun {
                guid: Uuid::parse_str(&guid_str)
                    .map_err(|e| crate::Error::Internal(format!("Invalid sync run guid: {}", e)))?,
                source: row.try_get("source")?,
                started_at: row.try_get("started_at")?,
                finished_at: row.try_get("finished_at")?,
                created: row.try_get("created")?,
                updated: row.try_get("updated")?,
                unchanged: row.try_get("unchanged")?,
                skipped: row.try_get("skipped")?,
                failed: row.try_get("failed")?,
            }))
        }
        None => Ok(None),
    }
}
