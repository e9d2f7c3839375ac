//! Integration tests for database initialization
//!
//! Covers first-run creation, reopening an existing database, the unique
//! name key surviving a reopen, and read-only access for the query API.

use subcat_common::db::{
    connect_readonly, count_substances, init_database, insert_substance, load_substance_by_name,
};
use subcat_common::{CanonicalSubstance, Error};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("catalog.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_and_keeps_records() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let pool = init_database(&db_path).await.unwrap();
    let mut lsd = CanonicalSubstance::new("LSD");
    lsd.summary = Some("A psychedelic.".to_string());
    insert_substance(&pool, &lsd).await.unwrap();
    pool.close().await;

    // Second open runs the idempotent schema creation again
    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(count_substances(&pool).await.unwrap(), 1);

    let loaded = load_substance_by_name(&pool, "lsd").await.unwrap().unwrap();
    assert_eq!(loaded.guid, lsd.guid);

    let err = insert_substance(&pool, &CanonicalSubstance::new("Lsd")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_schema_version_recorded() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("catalog.db")).await.unwrap();

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(version, 1);
}

#[tokio::test]
async fn test_readonly_requires_existing_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("absent.db");

    let err = connect_readonly(&db_path).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(!db_path.exists(), "Read-only open must not create the file");
}

#[tokio::test]
async fn test_readonly_reads_but_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let writer = init_database(&db_path).await.unwrap();
    insert_substance(&writer, &CanonicalSubstance::new("Caffeine")).await.unwrap();

    let reader = connect_readonly(&db_path).await.unwrap();
    assert!(load_substance_by_name(&reader, "caffeine").await.unwrap().is_some());

    let result = insert_substance(&reader, &CanonicalSubstance::new("Nicotine")).await;
    assert!(result.is_err(), "Write through a read-only pool should fail");
}
