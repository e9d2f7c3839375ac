//! Secondary-source (TripSit) dataset shapes
//!
//! The dataset is a JSON object mapping a key (usually the substance name)
//! to an entry. Entries stay as raw JSON until the engine parses them one at
//! a time, so a single malformed entry never fails the whole dataset.

use crate::error::{EntryError, SyncError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Full secondary-source dataset
#[derive(Debug, Clone, Default)]
pub struct SourceDataset {
    entries: BTreeMap<String, Value>,
}

impl SourceDataset {
    /// Build from a top-level JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        match value {
            Value::Object(map) => Ok(Self {
                entries: map.into_iter().collect(),
            }),
            other => Err(SyncError::Parse(format!(
                "dataset must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SyncError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| SyncError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, raw entry)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for SourceDataset {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// One dataset entry
///
/// Unknown fields are ignored. A field whose JSON type does not match makes
/// the entry malformed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceEntry {
    /// Outer `None`: field absent. `Some(None)`: explicit `null`.
    #[serde(default, deserialize_with = "present_field")]
    pub name: Option<Option<String>>,
    #[serde(default)]
    pub properties: Option<SourceProperties>,
    #[serde(default)]
    pub links: Option<SourceLinks>,
    /// route → {light?, common?, strong?, heavy?}
    #[serde(default)]
    pub dose: Option<BTreeMap<String, Value>>,
    /// route → {onset?, total?}, minutes
    #[serde(default)]
    pub duration: Option<BTreeMap<String, Value>>,
    /// partner → {status, note?}
    #[serde(default)]
    pub combos: Option<BTreeMap<String, SourceCombo>>,
    #[serde(default)]
    pub formatted_dose: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceProperties {
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceLinks {
    #[serde(default)]
    pub wiki: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceCombo {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl SourceEntry {
    pub fn from_value(value: &Value) -> Result<Self, EntryError> {
        Self::deserialize(value).map_err(|e| EntryError::MalformedShape(e.to_string()))
    }

    /// Display name: the `name` field, or the dataset key when the field is
    /// absent
    ///
    /// A `name` that is present but null or blank is unusable; the key is
    /// not substituted for it.
    pub fn display_name(&self, key: &str) -> Result<String, EntryError> {
        let name = match &self.name {
            None => key,
            Some(name) => name.as_deref().unwrap_or_default(),
        };

        Some(name.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or(EntryError::MissingName)
    }

    pub fn summary(&self) -> Option<&str> {
        self.properties.as_ref().and_then(|p| p.summary.as_deref())
    }

    pub fn wiki_url(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.wiki.as_deref())
    }

    /// Dose units declared by the entry, if any
    pub fn declared_units(&self) -> Option<&str> {
        self.formatted_dose
            .as_ref()
            .and_then(|f| f.get("units"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// Wrap a present field in `Some` so `null` and absent stay distinguishable
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_requires_object() {
        assert!(SourceDataset::from_value(json!({"lsd": {}})).is_ok());

        let err = SourceDataset::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, SyncError::Parse(msg) if msg.contains("array")));
    }

    #[test]
    fn test_display_name_prefers_name_field() {
        let entry = SourceEntry::from_value(&json!({"name": "LSD"})).unwrap();
        assert_eq!(entry.display_name("lsd").unwrap(), "LSD");

        let entry = SourceEntry::from_value(&json!({})).unwrap();
        assert_eq!(entry.display_name(" lsd ").unwrap(), "lsd");

        let entry = SourceEntry::from_value(&json!({})).unwrap();
        assert_eq!(entry.display_name(" ").unwrap_err(), EntryError::MissingName);
    }

    #[test]
    fn test_present_but_unusable_name_does_not_fall_back_to_key() {
        let entry = SourceEntry::from_value(&json!({"name": "  "})).unwrap();
        assert_eq!(entry.display_name("lsd").unwrap_err(), EntryError::MissingName);

        let entry = SourceEntry::from_value(&json!({"name": null})).unwrap();
        assert_eq!(entry.name, Some(None));
        assert_eq!(entry.display_name("lsd").unwrap_err(), EntryError::MissingName);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let entry = SourceEntry::from_value(&json!({
            "name": "Caffeine",
            "aliases": ["coffee"],
            "properties": {"summary": "A stimulant.", "categories": ["stimulant"]},
            "links": {"experiences": "https://example.org"}
        }))
        .unwrap();

        assert_eq!(entry.summary(), Some("A stimulant."));
        assert_eq!(entry.wiki_url(), None);
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let err = SourceEntry::from_value(&json!({"name": 42})).unwrap_err();
        assert!(matches!(err, EntryError::MalformedShape(_)));

        let err = SourceEntry::from_value(&json!({"dose": "50mg"})).unwrap_err();
        assert!(matches!(err, EntryError::MalformedShape(_)));

        let err = SourceEntry::from_value(&json!("not an object")).unwrap_err();
        assert!(matches!(err, EntryError::MalformedShape(_)));
    }

    #[test]
    fn test_declared_units() {
        let entry = SourceEntry::from_value(&json!({"formatted_dose": {"units": "µg"}})).unwrap();
        assert_eq!(entry.declared_units(), Some("µg"));

        let entry = SourceEntry::from_value(&json!({"formatted_dose": {"Oral": {"Light": "10mg"}}})).unwrap();
        assert_eq!(entry.declared_units(), None);
    }
}
