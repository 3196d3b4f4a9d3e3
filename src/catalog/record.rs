//! Record definitions for catalog items

use serde::{Deserialize, Serialize};

/// One cast entry on a detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,

    /// Headshot URL, absent when the page shows a placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One catalog item's accumulated data
///
/// Only `rank` is always present. List parsing fills the summary fields;
/// detail parsing fills the rest and flips `details_fetched`, which never
/// goes back to `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// 1-based position in the source ranking
    pub rank: u32,

    /// Stable external identifier (e.g. `tt0111161`), the canonical lookup key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Average rating in [0, 10]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub director: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cast: Vec<CastMember>,

    /// Display runtime as shown by the source (e.g. `2h 22m`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date_clean: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_usd: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_office: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_office_usd: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,

    /// Metacritic score in [0, 100]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metascore: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub oscar_wins: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_wins: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_nominations: Option<u32>,

    pub details_fetched: bool,
}

impl Record {
    /// Creates a list-only record at the given rank
    pub fn new(rank: u32) -> Self {
        Self {
            rank,
            ..Self::default()
        }
    }

    /// Title lower-cased for ordering, empty when absent
    pub fn sort_title(&self) -> String {
        self.title.as_deref().unwrap_or("").to_lowercase()
    }

    /// Text searched by free-text queries: title, genres, country and language
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(title) = &self.title {
            parts.push(title);
        }
        parts.extend(self.genres.iter().map(String::as_str));
        if let Some(country) = &self.country {
            parts.push(country);
        }
        if let Some(language) = &self.language {
            parts.push(language);
        }
        parts.join(" ")
    }
}
