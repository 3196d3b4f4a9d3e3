//! Statistics generation from the catalog
//!
//! This module provides functionality for summarizing a catalog and
//! displaying the summary on the console.

use crate::catalog::Catalog;
use std::collections::{HashMap, HashSet};

/// Catalog statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStatistics {
    /// Total number of records
    pub total_records: usize,

    /// Records whose detail page has been processed
    pub detailed_records: usize,

    /// Records with a rating
    pub rated_records: usize,

    /// Mean rating over rated records, rounded to two decimals
    pub average_rating: Option<f64>,

    /// Number of distinct countries
    pub unique_countries: usize,

    /// Genre counts, most common first
    pub genre_distribution: Vec<(String, usize)>,

    /// Country counts, most common first
    pub country_distribution: Vec<(String, usize)>,
}

/// Computes statistics over every record in the catalog
///
/// # Arguments
///
/// * `catalog` - The catalog to summarize
///
/// # Returns
///
/// The computed `CatalogStatistics`. Distributions are ordered by count
/// descending, then by name ascending.
pub fn compute_statistics(catalog: &Catalog) -> CatalogStatistics {
    let records = catalog.records();

    let ratings: Vec<f64> = records.iter().filter_map(|r| r.rating).collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        Some((mean * 100.0).round() / 100.0)
    };

    let mut genre_counts: HashMap<&str, usize> = HashMap::new();
    let mut country_counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let unique_genres: HashSet<&str> = record.genres.iter().map(String::as_str).collect();
        for genre in unique_genres {
            *genre_counts.entry(genre).or_insert(0) += 1;
        }
        if let Some(country) = record.country.as_deref() {
            *country_counts.entry(country).or_insert(0) += 1;
        }
    }

    CatalogStatistics {
        total_records: records.len(),
        detailed_records: catalog.detailed_count(),
        rated_records: ratings.len(),
        average_rating,
        unique_countries: country_counts.len(),
        genre_distribution: ranked(genre_counts),
        country_distribution: ranked(country_counts),
    }
}

fn ranked(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    println!("  With details: {}", stats.detailed_records);
    println!("  Rated: {}", stats.rated_records);
    match stats.average_rating {
        Some(average) => println!("  Average rating: {:.2}", average),
        None => println!("  Average rating: n/a"),
    }
    println!("  Unique countries: {}", stats.unique_countries);
    println!();

    if !stats.genre_distribution.is_empty() {
        println!("Genres:");
        for (genre, count) in &stats.genre_distribution {
            let percentage = (*count as f64 / stats.total_records.max(1) as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", genre, count, percentage);
        }
        println!();
    }

    if !stats.country_distribution.is_empty() {
        println!("Countries:");
        for (country, count) in stats.country_distribution.iter().take(10) {
            println!("  {}: {}", country, count);
        }
        println!();
    }
}
