//! Versioned disk cache for the catalog
//!
//! This module handles persisting the full record set between runs:
//! - The on-disk envelope format (`{version, saved_at, records}`)
//! - The `CatalogCache` trait the crawler depends on
//! - A JSON file implementation
//!
//! A cache is a performance optimization only. Loading treats every failure
//! as a miss and saving logs failures instead of returning them.

mod json_file;

pub use json_file::JsonFileCache;

use crate::catalog::{Catalog, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted snapshot of a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// Version tag; a mismatch invalidates the whole envelope
    pub version: String,

    /// When the snapshot was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,

    /// Records in rank order
    pub records: Vec<Record>,
}

impl CacheEnvelope {
    /// Wraps a catalog's records with the given version tag
    pub fn new(version: &str, catalog: &Catalog) -> Self {
        Self {
            version: version.to_string(),
            saved_at: Some(Utc::now()),
            records: catalog.records().to_vec(),
        }
    }
}

/// Storage backend for whole-catalog snapshots
pub trait CatalogCache {
    /// Restores the last saved catalog, or `None` on any kind of miss
    fn load(&self) -> Option<Catalog>;

    /// Replaces the stored snapshot with the given catalog
    ///
    /// Failures are logged and swallowed.
    fn save(&self, catalog: &Catalog);
}
