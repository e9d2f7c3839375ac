//! Field Merge Policy
//!
//! `merge` is a total function from (existing record, contributed fields) to
//! the minimal [`UpdateSet`]. Curated data always wins:
//! - a scalar is written only when the existing value is absent or blank and
//!   the contribution is not
//! - an interaction is appended only when its partner (case-insensitive) is
//!   not already recorded; conflicting severities are never merged
//! - routes are never backfilled on existing records

use subcat_common::models::{is_blank, name_key};
use subcat_common::{CanonicalSubstance, InteractionRecord, UpdateSet};

/// Fields a secondary-source entry contributes to a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributedFields {
    pub summary: Option<String>,
    pub url: Option<String>,
    /// Already normalized and filtered to actionable severities
    pub interactions: Vec<InteractionRecord>,
}

/// Compute the update set for `existing` given `contributed`
pub fn merge(existing: &CanonicalSubstance, contributed: &ContributedFields) -> UpdateSet {
    let mut update = UpdateSet {
        summary: fill_if_blank(existing.summary.as_deref(), contributed.summary.as_deref()),
        url: fill_if_blank(existing.url.as_deref(), contributed.url.as_deref()),
        appended_interactions: Vec::new(),
    };

    for interaction in &contributed.interactions {
        let key = name_key(&interaction.partner_name);
        let already_queued = update
            .appended_interactions
            .iter()
            .any(|i| i.partner_key() == key);

        if !already_queued && !existing.has_interaction_with(&interaction.partner_name) {
            update.appended_interactions.push(interaction.clone());
        }
    }

    update
}

fn fill_if_blank(existing: Option<&str>, contributed: Option<&str>) -> Option<String> {
    if is_blank(existing) && !is_blank(contributed) {
        contributed.map(str::to_string)
    } else {
        None
    }
}
