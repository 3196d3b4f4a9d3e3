//! Detail page parser
//!
//! Each field is read from a primary selector and then from progressively
//! more generic fallbacks, including the page's `Movie` JSON-LD block. Fields
//! that cannot be found are left as they were. A processed record is always
//! marked detail-complete, even when the page yielded nothing.

use crate::catalog::{CastMember, Record};
use crate::crawler::markup::{
    all_texts, element_text, find_json_ld, first_attr_in, first_text, first_text_in,
    json_f64, json_image, json_names, json_str, meta_content, selector,
};
use crate::extract::{
    clean_release_date, clean_title, extract_award_totals, extract_iso_duration_minutes,
    extract_language, extract_money, extract_oscar_count, extract_rating, extract_runtime_minutes,
    extract_score, format_runtime, normalize_certificate,
};
use scraper::Html;
use serde_json::Value;

/// Maximum number of cast members kept per record
pub const MAX_CAST: usize = 15;

/// Plot selectors tried before the structured data and meta tag tiers
const PLOT_SELECTORS: &[&str] = &[
    r#"[data-testid="plot-xl"]"#,
    r#"[data-testid="plot-l"]"#,
    r#"[data-testid="plot"]"#,
];

/// Enriches a record from its detail page markup
///
/// # Arguments
///
/// * `record` - The record to enrich in place
/// * `markup` - The detail page HTML
/// * `force` - Re-parse even if the record is already detail-complete
///
/// # Returns
///
/// `true` if the page was parsed, `false` if the record was already complete
/// and `force` was not set.
pub fn parse_detail(record: &mut Record, markup: &str, force: bool) -> bool {
    if record.details_fetched && !force {
        return false;
    }

    let document = Html::parse_document(markup);
    let movie = find_json_ld(&document, "Movie");
    let movie = movie.as_ref();

    fill_summary(record, &document, movie);

    if let Some(plot) = extract_plot(&document, movie) {
        record.plot = Some(plot);
    }

    let genres = extract_genres(&document, movie);
    if !genres.is_empty() {
        record.genres = genres;
    }

    if let Some(country) = extract_country(&document, movie) {
        record.country = Some(country);
    }

    let language = first_text(
        &document,
        r#"li[data-testid="title-details-languages"] .ipc-metadata-list-item__list-content-item"#,
    )
    .or_else(|| {
        movie
            .and_then(|m| m.get("inLanguage"))
            .map(json_names)
            .and_then(|names| names.into_iter().next())
    })
    .or_else(|| record.plot.as_deref().and_then(extract_language));
    if let Some(language) = language {
        record.language = Some(language);
    }

    let directors = extract_directors(&document, movie);
    if !directors.is_empty() {
        record.director = directors;
    }

    let cast = extract_cast(&document, movie);
    if !cast.is_empty() {
        record.cast = cast;
    }

    apply_runtime(record, &document, movie);
    apply_release_date(record, &document, movie);
    apply_money(record, &document);

    let certificate = first_text(
        &document,
        r#"li[data-testid="storyline-certificate"] .ipc-metadata-list-item__list-content-item"#,
    )
    .or_else(|| movie.and_then(|m| json_str(m, "contentRating")));
    if let Some(certificate) = certificate {
        record.certificate = Some(normalize_certificate(&certificate));
    }

    let metascore = first_text(&document, r#"[data-testid="metacritic-score-box"]"#)
        .or_else(|| first_text(&document, ".metacritic-score-box"))
        .and_then(|text| extract_score(&text));
    if metascore.is_some() {
        record.metascore = metascore;
    }

    apply_awards(record, &document);

    record.details_fetched = true;
    tracing::debug!(
        "Parsed details for rank {} ({})",
        record.rank,
        record.id.as_deref().unwrap_or("no id")
    );
    true
}

/// Fills list-level fields the list page did not provide
fn fill_summary(record: &mut Record, document: &Html, movie: Option<&Value>) {
    if record.title.is_none() {
        record.title = first_text(document, r#"h1[data-testid="hero__pageTitle"]"#)
            .or_else(|| movie.and_then(|m| json_str(m, "name")))
            .or_else(|| meta_content(document, "og:title"))
            .map(|raw| clean_title(&raw))
            .filter(|title| !title.is_empty());
    }

    if record.rating.is_none() {
        record.rating = first_text(
            document,
            r#"[data-testid="hero-rating-bar__aggregate-rating__score"]"#,
        )
        .and_then(|text| extract_rating(&text))
        .or_else(|| {
            movie
                .and_then(|m| m.get("aggregateRating"))
                .and_then(|a| a.get("ratingValue"))
                .and_then(json_f64)
                .filter(|rating| (0.0..=10.0).contains(rating))
        });
    }

    if record.rating_count.is_none() {
        record.rating_count = movie
            .and_then(|m| m.get("aggregateRating"))
            .and_then(|a| a.get("ratingCount"))
            .and_then(json_f64)
            .filter(|count| *count >= 0.0)
            .map(|count| count as u64);
    }

    if record.poster.is_none() {
        record.poster = movie
            .and_then(|m| m.get("image"))
            .and_then(json_image)
            .or_else(|| meta_content(document, "og:image"));
    }
}

fn extract_plot(document: &Html, movie: Option<&Value>) -> Option<String> {
    PLOT_SELECTORS
        .iter()
        .find_map(|css| first_text(document, css))
        .or_else(|| movie.and_then(|m| json_str(m, "description")))
        .or_else(|| meta_content(document, "og:description"))
        .or_else(|| meta_content(document, "description"))
}

fn extract_genres(document: &Html, movie: Option<&Value>) -> Vec<String> {
    let mut genres = all_texts(document, r#"[data-testid="genres"] .ipc-chip__text"#);
    if genres.is_empty() {
        genres = all_texts(document, r#"[data-testid="interests"] .ipc-chip__text"#);
    }
    if genres.is_empty() {
        genres = movie
            .and_then(|m| m.get("genre"))
            .map(json_names)
            .unwrap_or_default();
    }
    dedup_preserving_order(genres)
}

fn extract_country(document: &Html, movie: Option<&Value>) -> Option<String> {
    first_text(
        document,
        r#"li[data-testid="title-details-origin"] .ipc-metadata-list-item__list-content-item"#,
    )
    .or_else(|| {
        movie
            .and_then(|m| m.get("countryOfOrigin"))
            .map(json_names)
            .and_then(|names| names.into_iter().next())
    })
}

/// Names under the "Director" / "Directors" principal credit
fn extract_directors(document: &Html, movie: Option<&Value>) -> Vec<String> {
    let mut directors = Vec::new();

    if let Some(credit_selector) = selector(r#"li[data-testid="title-pc-principal-credit"]"#) {
        for credit in document.select(&credit_selector) {
            let label = first_text_in(credit, ".ipc-metadata-list-item__label").unwrap_or_default();
            if !label.to_lowercase().starts_with("director") {
                continue;
            }
            if let Some(link_selector) = selector(".ipc-metadata-list-item__list-content-item") {
                directors.extend(
                    credit
                        .select(&link_selector)
                        .map(element_text)
                        .filter(|name| !name.is_empty()),
                );
            }
            break;
        }
    }

    if directors.is_empty() {
        directors = movie
            .and_then(|m| m.get("director"))
            .map(json_names)
            .unwrap_or_default();
    }
    dedup_preserving_order(directors)
}

/// Cast with headshots from the cast grid, or names only from structured data
fn extract_cast(document: &Html, movie: Option<&Value>) -> Vec<CastMember> {
    let mut cast = Vec::new();

    if let Some(item_selector) = selector(r#"[data-testid="title-cast-item"]"#) {
        for item in document.select(&item_selector) {
            let Some(name) = first_text_in(item, r#"[data-testid="title-cast-item__actor"]"#)
            else {
                continue;
            };
            let image_url = first_attr_in(item, "img.ipc-image", "src");
            cast.push(CastMember { name, image_url });
            if cast.len() == MAX_CAST {
                break;
            }
        }
    }

    if cast.is_empty() {
        cast = movie
            .and_then(|m| m.get("actor"))
            .map(json_names)
            .unwrap_or_default()
            .into_iter()
            .take(MAX_CAST)
            .map(|name| CastMember {
                name,
                image_url: None,
            })
            .collect();
    }
    cast
}

fn apply_runtime(record: &mut Record, document: &Html, movie: Option<&Value>) {
    let display = first_text(
        document,
        r#"li[data-testid="title-techspec_runtime"] .ipc-metadata-list-item__list-content-item"#,
    )
    .or_else(|| {
        first_text(
            document,
            r#"li[data-testid="title-techspec_runtime"] .ipc-metadata-list-item__content-container"#,
        )
    });

    if let Some(display) = display {
        if let Some(minutes) = extract_runtime_minutes(&display) {
            record.runtime = Some(display);
            record.runtime_minutes = Some(minutes);
            return;
        }
    }

    if let Some(minutes) = movie
        .and_then(|m| json_str(m, "duration"))
        .and_then(|duration| extract_iso_duration_minutes(&duration))
    {
        record.runtime = Some(format_runtime(minutes));
        record.runtime_minutes = Some(minutes);
    }
}

fn apply_release_date(record: &mut Record, document: &Html, movie: Option<&Value>) {
    let release_date = first_text(
        document,
        r#"li[data-testid="title-details-releasedate"] .ipc-metadata-list-item__list-content-item"#,
    )
    .or_else(|| movie.and_then(|m| json_str(m, "datePublished")));

    if let Some(release_date) = release_date {
        record.release_date_clean = Some(clean_release_date(&release_date));
        record.release_date = Some(release_date);
    }
}

/// Budget, then worldwide gross with domestic gross as the fallback
fn apply_money(record: &mut Record, document: &Html) {
    if let Some(budget) = box_office_value(document, "title-boxoffice-budget") {
        record.budget_usd = extract_money(&budget);
        record.budget = Some(budget);
    }

    let gross = box_office_value(document, "title-boxoffice-cumulativeworldwidegross")
        .or_else(|| box_office_value(document, "title-boxoffice-grossdomestic"));
    if let Some(gross) = gross {
        record.box_office_usd = extract_money(&gross);
        record.box_office = Some(gross);
    }
}

fn box_office_value(document: &Html, testid: &str) -> Option<String> {
    first_text(
        document,
        &format!(r#"li[data-testid="{testid}"] .ipc-metadata-list-item__list-content-item"#),
    )
}

/// Awards summary plus the Oscar, win and nomination counts derived from it
fn apply_awards(record: &mut Record, document: &Html) {
    let Some(awards) = first_text(document, r#"[data-testid="award_information"]"#) else {
        return;
    };

    let (wins, nominations) = extract_award_totals(&awards);
    record.oscar_wins = Some(extract_oscar_count(&awards));
    record.total_wins = wins;
    record.total_nominations = nominations;
    record.awards = Some(awards);
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.iter().any(|existing| existing.eq_ignore_ascii_case(&value)) {
            unique.push(value);
        }
    }
    unique
}
