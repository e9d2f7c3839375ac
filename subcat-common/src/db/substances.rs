//! Substance table operations
//!
//! Row encoding for `CanonicalSubstance` plus the read queries behind the
//! search and detail endpoints.

use crate::models::{name_key, CanonicalSubstance, InteractionRecord, SubstanceSummary};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "SELECT guid, name, summary, url, featured, routes, interactions FROM substances";

fn substance_from_row(row: &SqliteRow) -> Result<CanonicalSubstance> {
    let guid_str: String = row.try_get("guid")?;
    let routes_json: String = row.try_get("routes")?;
    let interactions_json: String = row.try_get("interactions")?;

    Ok(CanonicalSubstance {
        guid: Uuid::parse_str(&guid_str)
            .map_err(|e| Error::Internal(format!("Invalid substance guid {}: {}", guid_str, e)))?,
        name: row.try_get("name")?,
        summary: row.try_get("summary")?,
        url: row.try_get("url")?,
        featured: row.try_get("featured")?,
        routes_of_administration: serde_json::from_str(&routes_json)?,
        interactions: serde_json::from_str(&interactions_json)?,
    })
}

/// Load substance by case-insensitive name
pub async fn load_substance_by_name(pool: &SqlitePool, name: &str) -> Result<Option<CanonicalSubstance>> {
    let row = sqlx::query(&format!("{} WHERE name_key = ?", SELECT_COLUMNS))
        .bind(name_key(name))
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(substance_from_row).transpose()
}

/// Load substance by exact (case-sensitive) name
pub async fn load_substance_by_exact_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<CanonicalSubstance>> {
    let row = sqlx::query(&format!("{} WHERE name = ?", SELECT_COLUMNS))
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(substance_from_row).transpose()
}

/// Detail lookup: exact match first, then case-insensitive fallback
pub async fn find_substance_detail(pool: &SqlitePool, name: &str) -> Result<Option<CanonicalSubstance>> {
    if let Some(substance) = load_substance_by_exact_name(pool, name).await? {
        return Ok(Some(substance));
    }

    load_substance_by_name(pool, name).await
}

/// Load every substance, sorted by name
pub async fn load_all_substances(pool: &SqlitePool) -> Result<Vec<CanonicalSubstance>> {
    let rows = sqlx::query(&format!("{} ORDER BY name ASC", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(substance_from_row).collect()
}

/// Search projection: optional case-insensitive substring filter, sorted by name
pub async fn search_substances(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: u32,
) -> Result<Vec<SubstanceSummary>> {
    let needle = search.map(name_key).filter(|s| !s.is_empty());

    // instr() instead of LIKE so user input is never a pattern
    let rows = sqlx::query(
        r#"
        SELECT name, summary, featured, url
        FROM substances
        WHERE ?1 IS NULL OR instr(name_key, ?1) > 0
        ORDER BY name ASC
        LIMIT ?2
        "#,
    )
    .bind(needle)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(SubstanceSummary {
                name: row.try_get("name")?,
                summary: row.try_get("summary")?,
                featured: row.try_get("featured")?,
                url: row.try_get("url")?,
            })
        })
        .collect()
}

/// Insert a new substance
///
/// Returns `Error::Conflict` when a record with the same case-insensitive
/// name already exists.
pub async fn insert_substance(pool: &SqlitePool, substance: &CanonicalSubstance) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO substances (
            guid, name, name_key, summary, url, featured, routes, interactions,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(substance.guid.to_string())
    .bind(&substance.name)
    .bind(substance.name_key())
    .bind(&substance.summary)
    .bind(&substance.url)
    .bind(substance.featured)
    .bind(serde_json::to_string(&substance.routes_of_administration)?)
    .bind(serde_json::to_string(&substance.interactions)?)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(format!(
            "Substance '{}' already exists",
            substance.name
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Load interactions for one record inside a transaction
pub async fn load_interactions_tx(
    tx: &mut Transaction<'_, Sqlite>,
    guid: Uuid,
) -> Result<Option<Vec<InteractionRecord>>> {
    let json: Option<String> = sqlx::query_scalar("SELECT interactions FROM substances WHERE guid = ?")
        .bind(guid.to_string())
        .fetch_optional(&mut **tx)
        .await?;

    json.map(|j| serde_json::from_str(&j).map_err(Error::from)).transpose()
}

/// Write the listed columns of one record inside a transaction
///
/// `None` leaves the column untouched. `summary` and `url` are only written
/// while the stored value is NULL or blank; curated values are never
/// replaced.
pub async fn update_substance_fields_tx(
    tx: &mut Transaction<'_, Sqlite>,
    guid: Uuid,
    summary: Option<&str>,
    url: Option<&str>,
    interactions: Option<&[InteractionRecord]>,
) -> Result<()> {
    let interactions_json = interactions.map(serde_json::to_string).transpose()?;

    sqlx::query(
        r#"
        UPDATE substances
        SET
            summary = CASE
                WHEN summary IS NULL OR trim(summary) = '' THEN COALESCE(?, summary)
                ELSE summary
            END,
            url = CASE
                WHEN url IS NULL OR trim(url) = '' THEN COALESCE(?, url)
                ELSE url
            END,
            interactions = COALESCE(?, interactions),
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(summary)
    .bind(url)
    .bind(interactions_json)
    .bind(guid.to_string())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Count stored substances
pub async fn count_substances(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM substances")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
