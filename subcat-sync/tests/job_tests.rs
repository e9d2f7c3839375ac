//! Sync job tests: file-backed datasets, dry runs, run history

use serde_json::json;
use std::path::PathBuf;
use subcat_common::db::{count_substances, init_database, insert_substance, load_latest_sync_run, load_substance_by_name};
use subcat_common::CanonicalSubstance;
use subcat_sync::job::{open_for_dry_run, run_dry, run_sync, DatasetSource};
use subcat_sync::SyncError;
use tempfile::TempDir;

fn write_dataset(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("drugs.json");
    let dataset = json!({
        "caffeine": {"name": "Caffeine", "properties": {"summary": "A stimulant."}},
        "ketamine": {"name": "Ketamine", "combos": {"Alcohol": {"status": "Dangerous"}}},
        "unnamed": {"properties": {"summary": "A dissociative."}},
        "blankname": {"name": "", "properties": {"summary": "orphan"}},
        "bad": {"dose": {"oral": {"light": "some"}}}
    });
    std::fs::write(&path, serde_json::to_vec(&dataset).unwrap()).unwrap();
    path
}

#[tokio::test]
async fn test_run_sync_from_file_records_run() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("catalog.db")).await.unwrap();
    let source = DatasetSource::File(write_dataset(&dir));

    let dataset = source.load().await.unwrap();
    let report = run_sync(&pool, &dataset, &source.label()).await.unwrap();

    // "unnamed" falls back to its key; "blankname" has an unusable name and
    // "bad" an unparseable dose
    assert_eq!(report.created, 3);
    assert_eq!(report.skipped, 2);
    assert!(load_substance_by_name(&pool, "unnamed").await.unwrap().is_some());
    assert!(load_substance_by_name(&pool, "blankname").await.unwrap().is_none());

    let run = load_latest_sync_run(&pool).await.unwrap().unwrap();
    assert_eq!(run.created, 3);
    assert_eq!(run.skipped, 2);
    assert!(run.source.starts_with("file://"));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");
    let pool = init_database(&db_path).await.unwrap();
    insert_substance(&pool, &CanonicalSubstance::new("Caffeine")).await.unwrap();

    let source = DatasetSource::File(write_dataset(&dir));
    let dataset = source.load().await.unwrap();

    let readonly = open_for_dry_run(&db_path).await.unwrap();
    assert!(readonly.is_some());
    let report = run_dry(readonly.as_ref(), &dataset).await.unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.created, 2);

    assert_eq!(count_substances(&pool).await.unwrap(), 1);
    let caffeine = load_substance_by_name(&pool, "caffeine").await.unwrap().unwrap();
    assert!(caffeine.summary.is_none());
    assert!(load_latest_sync_run(&pool).await.unwrap().is_none());
}

#[tokio::test]
async fn test_dry_run_does_not_create_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");
    let dataset = DatasetSource::File(write_dataset(&dir)).load().await.unwrap();

    let pool = open_for_dry_run(&db_path).await.unwrap();
    assert!(pool.is_none());

    let report = run_dry(pool.as_ref(), &dataset).await.unwrap();

    assert_eq!(report.created, 3);
    assert!(!db_path.exists(), "Dry run must not create the database file");
}

#[tokio::test]
async fn test_missing_dataset_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let source = DatasetSource::File(dir.path().join("absent.json"));

    let err = source.load().await.unwrap_err();
    assert!(matches!(err, SyncError::Io(_)));
}
