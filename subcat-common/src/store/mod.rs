//! Record Store
//!
//! The persistence seam the reconciliation engine writes through. Production
//! uses [`SqliteRecordStore`]; tests and dry runs use [`MemoryRecordStore`].
//!
//! Implementations guarantee:
//! - `find_by_name` compares names case-insensitively
//! - `insert` refuses a record whose case-insensitive name already exists
//! - `update_partial` is atomic for the one record it touches and never
//!   replaces a non-blank scalar

use crate::models::{CanonicalSubstance, InteractionRecord};
use crate::Result;
use async_trait::async_trait;
use uuid::Uuid;

mod memory;
mod sqlite;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// Declarative set of field writes for one existing record
///
/// Scalars are written only when `Some` and the stored value is absent or
/// blank. Interactions are appended to the record's existing list, never
/// replacing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSet {
    pub summary: Option<String>,
    pub url: Option<String>,
    pub appended_interactions: Vec<InteractionRecord>,
}

impl UpdateSet {
    /// An empty update set means "nothing to persist"
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.url.is_none() && self.appended_interactions.is_empty()
    }

    /// Names of the fields this update writes, for logging
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.summary.is_some() {
            fields.push("summary");
        }
        if self.url.is_some() {
            fields.push("url");
        }
        if !self.appended_interactions.is_empty() {
            fields.push("interactions");
        }
        fields
    }
}

/// Store of canonical substance records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a record by case-insensitive name
    async fn find_by_name(&self, name: &str) -> Result<Option<CanonicalSubstance>>;

    /// Insert a brand-new record
    async fn insert(&self, substance: &CanonicalSubstance) -> Result<()>;

    /// Apply an update set to the record identified by `guid`
    async fn update_partial(&self, guid: Uuid, update: &UpdateSet) -> Result<()>;
}

/// Append interactions whose partner is not yet present (case-insensitive)
///
/// Shared by both store implementations so they agree on the no-duplicate
/// partner invariant even if a caller hands them overlapping entries.
pub(crate) fn append_new_interactions(
    current: &mut Vec<InteractionRecord>,
    appended: &[InteractionRecord],
) {
    for interaction in appended {
        let key = interaction.partner_key();
        if !current.iter().any(|i| i.partner_key() == key) {
            current.push(interaction.clone());
        }
    }
}
