//! Name Matcher
//!
//! Resolves a candidate name to zero or one canonical record by
//! case-insensitive exact equality of name keys. No fuzzy or partial
//! matching: "MDMA" never matches "MDA".

use subcat_common::{CanonicalSubstance, RecordStore, Result};

pub struct NameMatcher<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> NameMatcher<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Find the canonical record for `candidate_name`, if any
    pub async fn find(&self, candidate_name: &str) -> Result<Option<CanonicalSubstance>> {
        let trimmed = candidate_name.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        self.store.find_by_name(trimmed).await
    }
}
