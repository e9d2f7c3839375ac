//! SQLite-backed record store

use super::{append_new_interactions, RecordStore, UpdateSet};
use crate::db::substances;
use crate::models::CanonicalSubstance;
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Record store over the `substances` table
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<CanonicalSubstance>> {
        substances::load_substance_by_name(&self.pool, name).await
    }

    async fn insert(&self, substance: &CanonicalSubstance) -> Result<()> {
        substances::insert_substance(&self.pool, substance).await
    }

    async fn update_partial(&self, guid: Uuid, update: &UpdateSet) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        // Read-append-write of the interactions document is one transaction
        let mut tx = self.pool.begin().await?;

        let mut interactions = substances::load_interactions_tx(&mut tx, guid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Substance {}", guid)))?;

        let interactions = if update.appended_interactions.is_empty() {
            None
        } else {
            append_new_interactions(&mut interactions, &update.appended_interactions);
            Some(interactions)
        };

        substances::update_substance_fields_tx(
            &mut tx,
            guid,
            update.summary.as_deref(),
            update.url.as_deref(),
            interactions.as_deref(),
        )
        .await?;

        tx.commit().await?;

        Ok(())
    }
}
