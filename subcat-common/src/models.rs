//! Canonical substance data model
//!
//! These are the documents held by the record store and returned by the
//! read API. Field names serialize in camelCase to match the catalog's
//! public JSON shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Normalized identity key for a substance or interaction partner name.
///
/// Two names are the same identity iff their keys are equal.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range collapsed to a single point estimate
    pub fn point(value: f64) -> Self {
        Self { min: value, max: value }
    }
}

/// Dose bands for one route of administration.
///
/// `heavy` is the lower bound of heavy-use territory, not a range.
/// Band boundaries are expected to be non-decreasing from light to heavy,
/// but upstream data is stored as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoseBands {
    pub light: Option<Range>,
    pub common: Option<Range>,
    pub strong: Option<Range>,
    pub heavy: Option<f64>,
}

impl DoseBands {
    pub fn is_empty(&self) -> bool {
        self.light.is_none() && self.common.is_none() && self.strong.is_none() && self.heavy.is_none()
    }
}

/// Onset and total duration, in minutes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationMinutes {
    pub onset: Option<Range>,
    pub total: Option<Range>,
}

/// One administration route (oral, intranasal, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub route_name: String,
    pub dose_units: String,
    pub dose_bands: DoseBands,
    pub duration_minutes: Option<DurationMinutes>,
}

/// Normalized risk classification for an interaction between two substances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Safe,
    Caution,
    Unsafe,
    Dangerous,
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "Safe",
            Severity::Caution => "Caution",
            Severity::Unsafe => "Unsafe",
            Severity::Dangerous => "Dangerous",
            Severity::Unknown => "Unknown",
        }
    }

    /// Whether an interaction of this severity carries an actionable warning.
    ///
    /// Only these severities are ever stored in a record's interactions.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Severity::Caution | Severity::Unsafe | Severity::Dangerous)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interaction warning against another substance or combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub partner_name: String,
    pub severity: Severity,
    pub note: Option<String>,
}

impl InteractionRecord {
    pub fn partner_key(&self) -> String {
        name_key(&self.partner_name)
    }
}

/// The unit of record in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalSubstance {
    #[serde(rename = "id")]
    pub guid: Uuid,
    pub name: String,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub featured: Option<bool>,
    pub routes_of_administration: Vec<RouteRecord>,
    pub interactions: Vec<InteractionRecord>,
}

impl CanonicalSubstance {
    /// Create an empty record with a fresh identity
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            guid: Uuid::new_v4(),
            name: name.into(),
            summary: None,
            url: None,
            featured: None,
            routes_of_administration: Vec::new(),
            interactions: Vec::new(),
        }
    }

    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }

    /// Whether an interaction with `partner` (case-insensitive) is already recorded
    pub fn has_interaction_with(&self, partner: &str) -> bool {
        let key = name_key(partner);
        self.interactions.iter().any(|i| i.partner_key() == key)
    }
}

/// Search result projection returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstanceSummary {
    pub name: String,
    pub summary: Option<String>,
    pub featured: Option<bool>,
    pub url: Option<String>,
}

/// Returns true when an optional text field carries no usable value
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
