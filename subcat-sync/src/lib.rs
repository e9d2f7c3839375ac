//! subcat-sync library
//!
//! Reconciles the TripSit dataset into the canonical substance catalog.
//! Exposed as a library so the pieces can be tested directly.

pub mod client;
pub mod engine;
pub mod error;
pub mod job;
pub mod matcher;
pub mod merge;
pub mod normalizer;
pub mod source;

pub use crate::engine::{reconcile, ReconciliationEngine, ReconciliationReport};
pub use crate::error::{EntryError, SyncError};
pub use crate::source::SourceDataset;
