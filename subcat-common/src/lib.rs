//! # Substance Catalog Common Library
//!
//! Shared code for the catalog services including:
//! - Canonical substance data model
//! - Record store trait with SQLite and in-memory implementations
//! - Database schema and queries
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

pub use error::{Error, Result};
pub use models::{CanonicalSubstance, InteractionRecord, RouteRecord, Severity};
pub use store::{RecordStore, UpdateSet};
