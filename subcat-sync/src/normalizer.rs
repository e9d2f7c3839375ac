//! Dose/Interaction Normalizer
//!
//! Translates the secondary source's vocabulary into the catalog's:
//! combo status strings become [`Severity`], scalar dose thresholds become
//! contiguous dose bands, point-estimate durations become ranges.

use crate::error::EntryError;
use serde_json::Value;
use subcat_common::models::{DoseBands, DurationMinutes, Range, RouteRecord, Severity};

/// Units assumed when an entry does not declare any
pub const FALLBACK_DOSE_UNITS: &str = "mg";

/// Map a secondary-source combo status to a canonical severity
///
/// Total: any string outside the known vocabulary is `Unknown`.
pub fn normalize_severity(status: &str) -> Severity {
    match status {
        "Dangerous" => Severity::Dangerous,
        "Unsafe" => Severity::Unsafe,
        "Caution" => Severity::Caution,
        "Low Risk & Synergy" => Severity::Safe,
        // Upstream typo, still present in published datasets
        "Low Risk & Synergyl" => Severity::Safe,
        "Low Risk & No Synergy" => Severity::Safe,
        "Low Risk & Decrease" => Severity::Safe,
        "Safe" => Severity::Safe,
        _ => Severity::Unknown,
    }
}

/// Build a route record from secondary-source dose and duration shapes
///
/// Bands are contiguous by construction: each band's lower bound is the
/// previous threshold (0 when that threshold is absent). `heavy` stays a
/// scalar. Inconsistent upstream thresholds are stored as given.
pub fn build_route_record(
    route_name: &str,
    dose_shape: Option<&Value>,
    duration_shape: Option<&Value>,
    fallback_units: &str,
) -> Result<RouteRecord, EntryError> {
    let dose_bands = match dose_shape {
        Some(shape) => build_dose_bands(route_name, shape)?,
        None => DoseBands::default(),
    };

    let duration_minutes = duration_shape
        .map(|shape| build_duration(route_name, shape))
        .transpose()?;

    Ok(RouteRecord {
        route_name: route_name.to_string(),
        dose_units: fallback_units.to_string(),
        dose_bands,
        duration_minutes,
    })
}

fn build_dose_bands(route: &str, shape: &Value) -> Result<DoseBands, EntryError> {
    let light = threshold(route, shape, "light")?;
    let common = threshold(route, shape, "common")?;
    let strong = threshold(route, shape, "strong")?;
    let heavy = threshold(route, shape, "heavy")?;

    Ok(DoseBands {
        light: light.map(|max| Range::new(0.0, max)),
        common: common.map(|max| Range::new(light.unwrap_or(0.0), max)),
        strong: strong.map(|max| Range::new(common.unwrap_or(0.0), max)),
        heavy,
    })
}

fn build_duration(route: &str, shape: &Value) -> Result<DurationMinutes, EntryError> {
    Ok(DurationMinutes {
        onset: threshold(route, shape, "onset")?.map(Range::point),
        total: threshold(route, shape, "total")?.map(Range::point),
    })
}

/// Read one optional numeric field of a route shape
///
/// Accepts JSON numbers and numeric strings; `null` and absent mean "no
/// value". Anything else, or a shape that is not an object, is malformed.
fn threshold(route: &str, shape: &Value, field: &str) -> Result<Option<f64>, EntryError> {
    let malformed = || EntryError::MalformedDose {
        route: route.to_string(),
        field: field.to_string(),
    };

    let object = shape.as_object().ok_or_else(malformed)?;

    let value = match object.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(malformed()),
    }
}
