//! Label extractors: spoken language and content certificate

use regex::Regex;
use std::sync::LazyLock;

/// Languages recognised in free text, in canonical display form
pub const KNOWN_LANGUAGES: &[&str] = &[
    "English", "French", "Spanish", "German", "Italian", "Japanese", "Korean", "Chinese",
    "Mandarin", "Cantonese", "Hindi", "Tamil", "Telugu", "Russian", "Portuguese", "Swedish",
    "Danish", "Norwegian", "Finnish", "Dutch", "Polish", "Czech", "Hungarian", "Greek", "Turkish",
    "Arabic", "Persian", "Hebrew", "Thai", "Vietnamese", "Indonesian", "Latin", "Bengali",
    "Urdu", "Romanian", "Ukrainian", "Irish",
];

/// Rating labels passed through (uppercased) by [`normalize_certificate`]
pub const KNOWN_CERTIFICATES: &[&str] = &[
    "G", "PG", "PG-13", "R", "NC-17", "NR", "X", "M", "GP", "M/PG", "TV-Y", "TV-Y7", "TV-G",
    "TV-PG", "TV-14", "TV-MA", "APPROVED", "PASSED", "U", "UA", "A", "12A", "15", "18",
];

static LANGUAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = KNOWN_LANGUAGES.join("|");
    Regex::new(&format!(r"(?i)\b({})\b", alternation)).expect("language regex should compile")
});

/// Detects a known language mentioned in the text
///
/// Matching is case-insensitive and whole-word; the leftmost mention wins and
/// is returned in canonical capitalised form.
pub fn extract_language(text: &str) -> Option<String> {
    let found = LANGUAGE_PATTERN.find(text)?.as_str();
    KNOWN_LANGUAGES
        .iter()
        .find(|language| language.eq_ignore_ascii_case(found))
        .map(|language| language.to_string())
}

/// Normalizes a content certificate label
///
/// - empty input and "not rated"/"unrated" variants become `NR`
/// - known labels are returned uppercased
/// - anything else passes through (trimmed) unchanged
pub fn normalize_certificate(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "NR".to_string();
    }

    let squashed: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if squashed == "notrated" || squashed == "unrated" {
        return "NR".to_string();
    }

    let upper = trimmed.to_ascii_uppercase();
    if KNOWN_CERTIFICATES.contains(&upper.as_str()) {
        upper
    } else {
        trimmed.to_string()
    }
}
