//! Text extractors for free-form scraped strings
//!
//! Every extractor takes display text and returns an optional typed value.
//! Absence is an expected outcome, never an error: the parsers call these on
//! whatever a selector produced and simply leave the field empty when nothing
//! matches.

mod labels;
mod numeric;

pub use labels::{extract_language, normalize_certificate, KNOWN_CERTIFICATES, KNOWN_LANGUAGES};
pub use numeric::{
    extract_award_totals, extract_iso_duration_minutes, extract_money, extract_oscar_count,
    extract_runtime_minutes, format_runtime,
};

use regex::Regex;
use std::sync::LazyLock;

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/title/(tt\d+)").expect("id regex should compile"));

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year regex should compile"));

static RANK_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+").expect("rank prefix regex should compile"));

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

static DECIMAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("decimal regex should compile"));

static TRAILING_PARENTHETICAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\([^)]*\)\s*$").expect("parenthetical regex should compile")
});

/// Extracts the title identifier (`tt` followed by digits) from a URL path
///
/// # Example
///
/// ```
/// use reel_ripple::extract::extract_id;
///
/// assert_eq!(
///     extract_id("https://www.imdb.com/title/tt0111161/?ref_=chttp_t_1"),
///     Some("tt0111161".to_string())
/// );
/// assert_eq!(extract_id("https://www.imdb.com/chart/top/"), None);
/// ```
pub fn extract_id(url: &str) -> Option<String> {
    ID_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns the first standalone four-digit year in [1900, 2099]
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_PATTERN
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Strips a leading "<digits>. " rank prefix from a list title
pub fn clean_title(raw: &str) -> String {
    let cleaned = clean_text(raw);
    RANK_PREFIX_PATTERN.replace(&cleaned, "").trim().to_string()
}

/// Decodes common HTML entities and collapses runs of whitespace
///
/// Structured data blocks carry titles such as `Schindler&apos;s List`; this
/// renders them as display text.
pub fn clean_text(raw: &str) -> String {
    let decoded = raw
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    WHITESPACE_PATTERN.replace_all(&decoded, " ").trim().to_string()
}

/// Returns the first decimal number in the text if it is a valid 0-10 rating
pub fn extract_rating(text: &str) -> Option<f64> {
    DECIMAL_PATTERN
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|rating| (0.0..=10.0).contains(rating))
}

/// Returns the first integer in the text if it is a valid 0-100 score
pub fn extract_score(text: &str) -> Option<u32> {
    DECIMAL_PATTERN
        .find(text)
        .and_then(|m| m.as_str().split('.').next()?.parse::<u32>().ok())
        .filter(|score| *score <= 100)
}

/// Drops a trailing parenthetical region from a release date
///
/// `"October 14, 1994 (United States)"` becomes `"October 14, 1994"`.
pub fn clean_release_date(raw: &str) -> String {
    let cleaned = clean_text(raw);
    TRAILING_PARENTHETICAL_PATTERN
        .replace(&cleaned, "")
        .trim()
        .to_string()
}
