//! Output module for catalog summaries
//!
//! This module handles computing and printing statistics over a crawled
//! catalog.

pub mod stats;

pub use stats::{compute_statistics, print_statistics, CatalogStatistics};
