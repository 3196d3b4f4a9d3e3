//! Query engine: filtering, sorting and free-text search over records
//!
//! All functions here are pure reads over borrowed records. The one criterion
//! that needs network work, genre filtering, is handled by
//! [`MovieCrawler::filter`](crate::crawler::MovieCrawler::filter), which
//! completes detail pages before delegating to [`filter`].

use crate::catalog::Record;
use crate::QueryError;
use regex::Regex;
use std::cmp::Ordering;

/// Genres accepted by [`parse_genre_list`], in canonical form
pub const KNOWN_GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Biography",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "Film-Noir",
    "History",
    "Horror",
    "Music",
    "Musical",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Sport",
    "Thriller",
    "War",
    "Western",
];

/// Conjunctive filter criteria; unset fields do not constrain
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the title
    pub keyword: Option<String>,

    /// Inclusive lower bound on year
    pub year_start: Option<i32>,

    /// Inclusive upper bound on year
    pub year_end: Option<i32>,

    /// Inclusive lower bound on rating
    pub min_rating: Option<f64>,

    /// Inclusive upper bound on rating
    pub max_rating: Option<f64>,

    /// Inclusive lower bound on rank
    pub rank_start: Option<u32>,

    /// Inclusive upper bound on rank
    pub rank_end: Option<u32>,

    /// A record matches if any of its genres contains any of these as a whole word
    pub genres: Vec<String>,
}

impl FilterCriteria {
    /// Returns true if no criterion is set
    pub fn is_empty(&self) -> bool {
        self.keyword.is_none()
            && self.year_start.is_none()
            && self.year_end.is_none()
            && self.min_rating.is_none()
            && self.max_rating.is_none()
            && self.rank_start.is_none()
            && self.rank_end.is_none()
            && self.genres.is_empty()
    }

    /// Returns true if applying these criteria needs detail-page data
    pub fn requires_details(&self) -> bool {
        !self.genres.is_empty()
    }
}

/// Sort keys for [`sort_by`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Rating,
    Year,
    Rank,
    BoxOffice,
    OscarWins,
}

impl SortKey {
    /// Numeric sort value; absent values sort as 0
    fn value(&self, record: &Record) -> f64 {
        match self {
            Self::Rating => record.rating.unwrap_or(0.0),
            Self::Year => f64::from(record.year.unwrap_or(0)),
            Self::Rank => f64::from(record.rank),
            Self::BoxOffice => record.box_office_usd.unwrap_or(0) as f64,
            Self::OscarWins => f64::from(record.oscar_wins.unwrap_or(0)),
        }
    }
}

/// Applies every set criterion to the records (logical AND)
///
/// A record missing a field fails any criterion that reads that field.
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let keyword = criteria
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase);
    let genre_patterns = genre_patterns(&criteria.genres);

    records
        .into_iter()
        .filter(|record| {
            if let Some(keyword) = &keyword {
                match &record.title {
                    Some(title) if title.to_lowercase().contains(keyword.as_str()) => {}
                    _ => return false,
                }
            }

            if criteria.year_start.is_some() || criteria.year_end.is_some() {
                let start = criteria.year_start.unwrap_or(i32::MIN);
                let end = criteria.year_end.unwrap_or(i32::MAX);
                match record.year {
                    Some(year) if (start..=end).contains(&year) => {}
                    _ => return false,
                }
            }

            if criteria.min_rating.is_some() || criteria.max_rating.is_some() {
                let min = criteria.min_rating.unwrap_or(f64::NEG_INFINITY);
                let max = criteria.max_rating.unwrap_or(f64::INFINITY);
                match record.rating {
                    Some(rating) if rating >= min && rating <= max => {}
                    _ => return false,
                }
            }

            let rank_start = criteria.rank_start.unwrap_or(u32::MIN);
            let rank_end = criteria.rank_end.unwrap_or(u32::MAX);
            if !(rank_start..=rank_end).contains(&record.rank) {
                return false;
            }

            if !genre_patterns.is_empty() {
                let matches_genre = record.genres.iter().any(|genre| {
                    genre_patterns
                        .iter()
                        .any(|pattern| pattern.is_match(genre))
                });
                if !matches_genre {
                    return false;
                }
            }

            true
        })
        .collect()
}

fn genre_patterns(genres: &[String]) -> Vec<Regex> {
    genres
        .iter()
        .map(|genre| genre.trim())
        .filter(|genre| !genre.is_empty())
        .filter_map(|genre| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(genre))).ok())
        .collect()
}

/// Orders records by lower-cased title, A to Z
///
/// The sort is stable: records with equal titles keep their relative order.
pub fn sort_alphabetical<'a, I>(records: I) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut sorted: Vec<(String, &Record)> = records
        .into_iter()
        .map(|record| (record.sort_title(), record))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted.into_iter().map(|(_, record)| record).collect()
}

/// Orders records by a numeric key, stable for ties
pub fn sort_by<'a, I>(records: I, key: SortKey, descending: bool) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut sorted: Vec<&Record> = records.into_iter().collect();
    sorted.sort_by(|a, b| {
        let ordering: Ordering = key.value(a).total_cmp(&key.value(b));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    sorted
}

/// Case-insensitive literal substring search
///
/// Matches against the title, genres, country and language. The term is used
/// as given, surrounding whitespace included; an empty term matches nothing.
pub fn search<'a, I>(records: I, term: &str) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();

    records
        .into_iter()
        .filter(|record| record.search_text().to_lowercase().contains(&needle))
        .collect()
}

/// Records with at least one Oscar win, most wins first
pub fn oscar_winners<'a, I>(records: I) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let winners: Vec<&Record> = records
        .into_iter()
        .filter(|record| record.oscar_wins.unwrap_or(0) > 0)
        .collect();
    sort_by(winners, SortKey::OscarWins, true)
}

/// Parses a comma-separated genre list, validating every candidate
///
/// Each candidate is checked against [`KNOWN_GENRES`] case-insensitively and
/// returned in canonical form.
///
/// # Errors
///
/// Returns `QueryError::UnknownGenre` for the first candidate that is not a
/// known genre.
pub fn parse_genre_list(input: &str) -> Result<Vec<String>, QueryError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| {
            KNOWN_GENRES
                .iter()
                .find(|known| known.eq_ignore_ascii_case(candidate))
                .map(|known| known.to_string())
                .ok_or_else(|| QueryError::UnknownGenre(candidate.to_string()))
        })
        .collect()
}
