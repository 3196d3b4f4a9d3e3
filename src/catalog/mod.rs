//! Catalog of crawled records
//!
//! The catalog owns the ordered record list. Its id index maps identifiers to
//! positions in that list and is rebuilt whenever the list is replaced, so it
//! never outlives or owns the records it points at.

mod record;
pub mod query;

pub use record::{CastMember, Record};

use std::collections::HashMap;

/// Ordered records plus an id index for one crawl session
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from records, building the id index
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut catalog = Self::new();
        catalog.replace(records);
        catalog
    }

    /// Replaces all records and rebuilds the index from scratch
    ///
    /// When two records share an id the first keeps the index entry; the
    /// later one stays in the ordered list but is not reachable by id.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (position, record) in self.records.iter().enumerate() {
            if let Some(id) = &record.id {
                if self.index.contains_key(id) {
                    tracing::warn!("Duplicate id {} at rank {}, not indexed", id, record.rank);
                    continue;
                }
                self.index.insert(id.clone(), position);
            }
        }
    }

    /// All records in rank order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access for in-place enrichment
    ///
    /// Enrichment may change any field except `id`, so the index stays valid.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Consumes the catalog, returning its records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Looks up a record by id via the index
    pub fn get_by_id(&self, id: &str) -> Option<&Record> {
        self.index.get(id).and_then(|&position| self.records.get(position))
    }

    /// Position of the record with the given id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Looks up a record by rank with a linear scan
    pub fn get_by_rank(&self, rank: u32) -> Option<&Record> {
        self.records.iter().find(|record| record.rank == rank)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the catalog holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records indexed by id
    pub fn indexed_len(&self) -> usize {
        self.index.len()
    }

    /// Number of records whose detail page has been processed
    pub fn detailed_count(&self) -> usize {
        self.records.iter().filter(|r| r.details_fetched).count()
    }
}
