//! In-memory record store for tests and dry runs

use super::{append_new_interactions, RecordStore, UpdateSet};
use crate::models::{is_blank, name_key, CanonicalSubstance};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Record store held in memory, keyed by name key
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<String, CanonicalSubstance>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, keeping the first record for each name key
    pub fn with_records(records: impl IntoIterator<Item = CanonicalSubstance>) -> Self {
        let mut map = BTreeMap::new();
        for record in records {
            map.entry(record.name_key()).or_insert(record);
        }

        Self {
            records: RwLock::new(map),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<CanonicalSubstance>> {
        Ok(self.records.read().await.get(&name_key(name)).cloned())
    }

    async fn insert(&self, substance: &CanonicalSubstance) -> Result<()> {
        let mut records = self.records.write().await;
        let key = substance.name_key();

        if records.contains_key(&key) {
            return Err(Error::Conflict(format!(
                "Substance '{}' already exists",
                substance.name
            )));
        }

        records.insert(key, substance.clone());
        Ok(())
    }

    async fn update_partial(&self, guid: Uuid, update: &UpdateSet) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .values_mut()
            .find(|r| r.guid == guid)
            .ok_or_else(|| Error::NotFound(format!("Substance {}", guid)))?;

        fill_if_blank(&mut record.summary, update.summary.as_deref());
        fill_if_blank(&mut record.url, update.url.as_deref());
        append_new_interactions(&mut record.interactions, &update.appended_interactions);

        Ok(())
    }
}

/// Write `value` only while the stored field is absent or blank
fn fill_if_blank(field: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value {
        if is_blank(field.as_deref()) {
            *field = Some(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_conflict_is_case_insensitive() {
        let store = MemoryRecordStore::new();
        store.insert(&CanonicalSubstance::new("lsd")).await.unwrap();

        let err = store.insert(&CanonicalSubstance::new("LSD")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let store = MemoryRecordStore::with_records([CanonicalSubstance::new("Ketamine")]);

        assert!(store.find_by_name("KETAMINE").await.unwrap().is_some());
        assert!(store.find_by_name("Ketamin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_partial_sets_summary() {
        let record = CanonicalSubstance::new("Caffeine");
        let guid = record.guid;
        let store = MemoryRecordStore::with_records([record]);

        let update = UpdateSet {
            summary: Some("A stimulant.".to_string()),
            ..Default::default()
        };
        store.update_partial(guid, &update).await.unwrap();

        let loaded = store.find_by_name("caffeine").await.unwrap().unwrap();
        assert_eq!(loaded.summary.as_deref(), Some("A stimulant."));
    }

    #[tokio::test]
    async fn test_update_partial_keeps_curated_scalars() {
        let mut record = CanonicalSubstance::new("Caffeine");
        record.summary = Some("Curated.".to_string());
        record.url = Some("   ".to_string());
        let guid = record.guid;
        let store = MemoryRecordStore::with_records([record]);

        let update = UpdateSet {
            summary: Some("Secondary.".to_string()),
            url: Some("https://wiki.tripsit.me/wiki/Caffeine".to_string()),
            ..Default::default()
        };
        store.update_partial(guid, &update).await.unwrap();

        let loaded = store.find_by_name("caffeine").await.unwrap().unwrap();
        assert_eq!(loaded.summary.as_deref(), Some("Curated."));
        assert_eq!(loaded.url.as_deref(), Some("https://wiki.tripsit.me/wiki/Caffeine"));
    }
}
