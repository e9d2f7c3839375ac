//! Reconciliation Engine
//!
//! Drives one full pass over a secondary-source dataset. Per entry:
//! 1. Parse and normalize (name, contributed fields, routes)
//! 2. Match against the store by case-insensitive name
//! 3. Found: merge and write the update set if it is non-empty
//! 4. Not found: create a new canonical record
//!
//! Entries are processed one at a time. Each entry touches only its own
//! matched record, so the pass is idempotent: running it again over the same
//! dataset creates and updates nothing. A failing entry is counted and the
//! pass moves on.

use crate::error::EntryError;
use crate::matcher::NameMatcher;
use crate::merge::{merge, ContributedFields};
use crate::normalizer::{build_route_record, normalize_severity, FALLBACK_DOSE_UNITS};
use crate::source::{SourceDataset, SourceEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use subcat_common::models::name_key;
use subcat_common::{CanonicalSubstance, InteractionRecord, RecordStore, RouteRecord};
use tracing::{debug, info, warn};

/// Note attached to interactions whose source entry carries none
pub const DEFAULT_INTERACTION_NOTE: &str = "From TripSit";

/// Counts and failures from one reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// New records inserted
    pub created: usize,
    /// Existing records that received at least one field
    pub updated: usize,
    /// Matched records with nothing new to add
    pub unchanged: usize,
    /// Malformed entries (no usable name, unparseable shape)
    pub skipped: usize,
    /// Entries whose store lookup or write failed
    pub failures: Vec<EntryFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ReconciliationReport {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            created: 0,
            updated: 0,
            unchanged: 0,
            skipped: 0,
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Total entries accounted for
    pub fn processed(&self) -> usize {
        self.created + self.updated + self.unchanged + self.skipped + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A per-entry store failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryFailure {
    pub name: String,
    pub message: String,
}

/// One dataset entry translated into catalog vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEntry {
    pub name: String,
    pub contributed: ContributedFields,
    pub routes: Vec<RouteRecord>,
}

impl CandidateEntry {
    /// Build the brand-new record for an unmatched entry
    pub fn into_new_record(self) -> CanonicalSubstance {
        let mut record = CanonicalSubstance::new(self.name);
        record.summary = self.contributed.summary;
        record.url = self.contributed.url;
        record.featured = Some(false);
        record.routes_of_administration = self.routes;
        record.interactions = self.contributed.interactions;
        record
    }
}

/// Parse and normalize one raw dataset entry
pub fn normalize_entry(key: &str, raw: &Value) -> Result<CandidateEntry, EntryError> {
    let entry = SourceEntry::from_value(raw)?;
    let name = entry.display_name(key)?;

    let contributed = ContributedFields {
        summary: entry.summary().filter(|s| !s.trim().is_empty()).map(str::to_string),
        url: entry.wiki_url().filter(|u| !u.trim().is_empty()).map(str::to_string),
        interactions: actionable_interactions(&entry),
    };

    Ok(CandidateEntry {
        name,
        contributed,
        routes: route_records(&entry)?,
    })
}

/// Combos normalized to severities, keeping only actionable ones
///
/// Partners are unique by name key; the first occurrence wins.
fn actionable_interactions(entry: &SourceEntry) -> Vec<InteractionRecord> {
    let mut seen = BTreeSet::new();
    let mut interactions = Vec::new();

    for (partner, combo) in entry.combos.iter().flatten() {
        let partner = partner.trim();
        let severity = normalize_severity(combo.status.as_deref().unwrap_or_default());

        if partner.is_empty() || !severity.is_actionable() || !seen.insert(name_key(partner)) {
            continue;
        }

        interactions.push(InteractionRecord {
            partner_name: partner.to_string(),
            severity,
            note: Some(
                combo
                    .note
                    .as_deref()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(DEFAULT_INTERACTION_NOTE)
                    .to_string(),
            ),
        });
    }

    interactions
}

/// One route record per route named in the dose or duration shapes
///
/// Dose routes come first in key order, then duration-only routes.
fn route_records(entry: &SourceEntry) -> Result<Vec<RouteRecord>, EntryError> {
    let units = entry.declared_units().unwrap_or(FALLBACK_DOSE_UNITS);
    let doses = entry.dose.as_ref();
    let durations = entry.duration.as_ref();

    let mut route_names: Vec<&String> = doses.into_iter().flat_map(|d| d.keys()).collect();
    for name in durations.into_iter().flat_map(|d| d.keys()) {
        if !doses.is_some_and(|d| d.contains_key(name)) {
            route_names.push(name);
        }
    }

    route_names
        .into_iter()
        .map(|route| {
            build_route_record(
                route,
                doses.and_then(|d| d.get(route)),
                durations.and_then(|d| d.get(route)),
                units,
            )
        })
        .collect()
}

/// What happened to one entry
#[derive(Debug)]
enum EntryOutcome {
    Created,
    Updated,
    Unchanged,
    Skipped(EntryError),
    Failed(String, subcat_common::Error),
}

/// Reconciliation engine bound to one record store
pub struct ReconciliationEngine<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> ReconciliationEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Run one full pass over `dataset`
    pub async fn reconcile(&self, dataset: &SourceDataset) -> ReconciliationReport {
        let mut report = ReconciliationReport::start();
        info!(entries = dataset.len(), "Starting reconciliation pass");

        for (key, raw) in dataset.iter() {
            match self.reconcile_entry(key, raw).await {
                EntryOutcome::Created => report.created += 1,
                EntryOutcome::Updated => report.updated += 1,
                EntryOutcome::Unchanged => report.unchanged += 1,
                EntryOutcome::Skipped(reason) => {
                    warn!(key = %key, reason = %reason, "Skipping dataset entry");
                    report.skipped += 1;
                }
                EntryOutcome::Failed(name, e) => {
                    warn!(name = %name, error = %e, "Failed to reconcile entry");
                    report.failures.push(EntryFailure {
                        name,
                        message: e.to_string(),
                    });
                }
            }
        }

        report.finished_at = Utc::now();
        info!(
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Reconciliation pass complete"
        );

        report
    }

    async fn reconcile_entry(&self, key: &str, raw: &Value) -> EntryOutcome {
        let candidate = match normalize_entry(key, raw) {
            Ok(candidate) => candidate,
            Err(reason) => return EntryOutcome::Skipped(reason),
        };

        let existing = match NameMatcher::new(self.store).find(&candidate.name).await {
            Ok(existing) => existing,
            Err(e) => return EntryOutcome::Failed(candidate.name, e),
        };

        match existing {
            Some(existing) => {
                let update = merge(&existing, &candidate.contributed);
                if update.is_empty() {
                    debug!(name = %existing.name, "Nothing new to merge");
                    return EntryOutcome::Unchanged;
                }

                match self.store.update_partial(existing.guid, &update).await {
                    Ok(()) => {
                        info!(
                            name = %existing.name,
                            fields = ?update.field_names(),
                            interactions_added = update.appended_interactions.len(),
                            "Updated substance"
                        );
                        EntryOutcome::Updated
                    }
                    Err(e) => EntryOutcome::Failed(existing.name, e),
                }
            }
            None => {
                let name = candidate.name.clone();
                let record = candidate.into_new_record();

                match self.store.insert(&record).await {
                    Ok(()) => {
                        info!(
                            name = %record.name,
                            routes = record.routes_of_administration.len(),
                            interactions = record.interactions.len(),
                            "Created substance"
                        );
                        EntryOutcome::Created
                    }
                    Err(e) => EntryOutcome::Failed(name, e),
                }
            }
        }
    }
}

/// Run one reconciliation pass of `dataset` into `store`
pub async fn reconcile<S: RecordStore + ?Sized>(store: &S, dataset: &SourceDataset) -> ReconciliationReport {
    ReconciliationEngine::new(store).reconcile(dataset).await
}
