//! Error types for subcat-sync
//!
//! Two severities:
//! - [`SyncError`] aborts the whole pass (the dataset could not be obtained,
//!   or the store could not be opened)
//! - [`EntryError`] skips one dataset entry; the pass continues

use thiserror::Error;

/// Fatal sync errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Source returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] subcat_common::Error),
}

/// Reasons a single dataset entry is skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("entry has no usable name")]
    MissingName,

    #[error("entry is not a valid source object: {0}")]
    MalformedShape(String),

    #[error("route '{route}' has an unparseable {field} value")]
    MalformedDose { route: String, field: String },
}
