//! Ranked list page parser
//!
//! Two tiers, tried in order:
//! 1. The embedded `ItemList` JSON-LD block, mapped item by item
//! 2. Structural parsing of the repeated list-item markup
//!
//! Whichever tier produces records, the result is put in position order,
//! stripped of duplicate ids, truncated to the catalog size and ranked 1..n.

use crate::catalog::Record;
use crate::crawler::markup::{
    element_text, first_attr_in, first_text_in, json_f64, json_image, json_ld_objects, json_names,
    json_str, resolve_url, selector,
};
use crate::extract::{
    clean_title, extract_id, extract_iso_duration_minutes, extract_rating, extract_runtime_minutes,
    extract_year, format_runtime, normalize_certificate, KNOWN_CERTIFICATES,
};
use crate::ParseFailure;
use scraper::Html;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Parses a ranked list page into partial records
///
/// # Arguments
///
/// * `markup` - The list page HTML
/// * `base_url` - Base for resolving relative title and poster links
/// * `catalog_size` - Maximum number of records to keep
///
/// # Returns
///
/// * `Ok(Vec<Record>)` - Records ranked 1..n, none detail-complete
/// * `Err(ParseFailure::NoRecords)` - Neither tier produced a single record
pub fn parse_list(
    markup: &str,
    base_url: &Url,
    catalog_size: usize,
) -> Result<Vec<Record>, ParseFailure> {
    let document = Html::parse_document(markup);

    let mut entries = parse_structured(&document, base_url);
    if entries.is_empty() {
        tracing::debug!("No usable ItemList block, falling back to list markup");
        entries = parse_markup(&document, base_url);
    } else {
        tracing::debug!("Parsed {} entries from ItemList block", entries.len());
    }

    let records = finalize(entries, catalog_size);
    if records.is_empty() {
        return Err(ParseFailure::NoRecords);
    }
    Ok(records)
}

/// Orders entries by source position, drops repeated ids, truncates and ranks
fn finalize(mut entries: Vec<(u64, Record)>, catalog_size: usize) -> Vec<Record> {
    entries.sort_by_key(|(position, _)| *position);

    let mut seen = HashSet::new();
    let mut records: Vec<Record> = entries
        .into_iter()
        .map(|(_, record)| record)
        .filter(|record| match &record.id {
            Some(id) => {
                let first = seen.insert(id.clone());
                if !first {
                    tracing::debug!("Dropping repeated list entry for {}", id);
                }
                first
            }
            None => true,
        })
        .take(catalog_size)
        .collect();

    for (rank, record) in (1u32..).zip(records.iter_mut()) {
        record.rank = rank;
    }
    records
}

/// Maps every `ItemList` element to a record, keyed by its `position`
fn parse_structured(document: &Html, base_url: &Url) -> Vec<(u64, Record)> {
    let Some(elements) = json_ld_objects(document).into_iter().find_map(|object| {
        match object.get("itemListElement") {
            Some(Value::Array(elements)) if !elements.is_empty() => Some(elements.clone()),
            _ => None,
        }
    }) else {
        return Vec::new();
    };

    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let item = element.get("item").unwrap_or(element);
            if !item.is_object() {
                return None;
            }
            let position = element
                .get("position")
                .and_then(json_f64)
                .map(|p| p as u64)
                .unwrap_or(index as u64 + 1);
            Some((position, structured_record(item, base_url)))
        })
        .collect()
}

fn structured_record(item: &Value, base_url: &Url) -> Record {
    let mut record = Record::default();

    record.title = json_str(item, "name")
        .map(|name| clean_title(&name))
        .filter(|title| !title.is_empty());
    record.url = json_str(item, "url").and_then(|href| resolve_url(base_url, &href));
    record.id = record.url.as_deref().and_then(extract_id);
    record.poster = item
        .get("image")
        .and_then(json_image)
        .and_then(|href| resolve_url(base_url, &href));

    if let Some(aggregate) = item.get("aggregateRating") {
        record.rating = aggregate
            .get("ratingValue")
            .and_then(json_f64)
            .filter(|rating| (0.0..=10.0).contains(rating));
        record.rating_count = aggregate
            .get("ratingCount")
            .and_then(json_f64)
            .filter(|count| *count >= 0.0)
            .map(|count| count as u64);
    }

    record.year = json_str(item, "description")
        .and_then(|description| extract_year(&description))
        .or_else(|| json_str(item, "datePublished").and_then(|date| extract_year(&date)));

    record.certificate = json_str(item, "contentRating").map(|raw| normalize_certificate(&raw));

    if let Some(minutes) = json_str(item, "duration").and_then(|d| extract_iso_duration_minutes(&d))
    {
        record.runtime = Some(format_runtime(minutes));
        record.runtime_minutes = Some(minutes);
    }

    if let Some(genre) = item.get("genre") {
        record.genres = json_names(genre);
    }

    record
}

/// Reads the repeated chart list items in document order
///
/// Items without a title are dropped.
fn parse_markup(document: &Html, base_url: &Url) -> Vec<(u64, Record)> {
    let Some(item_selector) = selector(r#"li[class*="ipc-metadata-list-summary-item"]"#) else {
        return Vec::new();
    };
    let metadata_selector = selector(r#"span[class*="cli-title-metadata-item"]"#);

    let mut entries = Vec::new();
    for item in document.select(&item_selector) {
        let title = first_text_in(item, "h3.ipc-title__text")
            .or_else(|| first_text_in(item, r#"a[href*="/title/tt"]"#))
            .map(|raw| clean_title(&raw))
            .filter(|title| !title.is_empty());
        let Some(title) = title else {
            tracing::debug!("Skipping list item without a title");
            continue;
        };

        let mut record = Record {
            title: Some(title),
            ..Record::default()
        };
        record.url = first_attr_in(item, r#"a[href*="/title/tt"]"#, "href")
            .and_then(|href| resolve_url(base_url, &href));
        record.id = record.url.as_deref().and_then(extract_id);
        record.poster = first_attr_in(item, "img.ipc-image", "src")
            .and_then(|href| resolve_url(base_url, &href));
        record.rating = first_text_in(item, r#"span[class*="ipc-rating-star"]"#)
            .and_then(|text| extract_rating(&text));

        if let Some(metadata_selector) = &metadata_selector {
            for text in item.select(metadata_selector).map(element_text) {
                apply_metadata_item(&mut record, &text);
            }
        }

        entries.push((entries.len() as u64 + 1, record));
    }
    entries
}

/// Classifies one metadata span (`1994`, `2h 22m`, `R`) onto the record
fn apply_metadata_item(record: &mut Record, text: &str) {
    if record.year.is_none() {
        if let Some(year) = extract_year(text) {
            record.year = Some(year);
            return;
        }
    }

    if record.runtime_minutes.is_none() {
        if let Some(minutes) = extract_runtime_minutes(text) {
            record.runtime = Some(text.to_string());
            record.runtime_minutes = Some(minutes);
            return;
        }
    }

    let upper = text.to_uppercase();
    if record.certificate.is_none()
        && (KNOWN_CERTIFICATES.contains(&upper.as_str()) || upper.contains("RATED"))
    {
        record.certificate = Some(normalize_certificate(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.imdb.com").unwrap()
    }

    const STRUCTURED_PAGE: &str = r#"<html><head>
    <script type="application/ld+json">
    {
      "@type": "ItemList",
      "itemListElement": [
        {"@type": "ListItem", "position": 2, "item": {
          "@type": "Movie",
          "url": "https://www.imdb.com/title/tt0068646/",
          "name": "The Godfather",
          "description": "The aging patriarch of an organized crime dynasty, 1972.",
          "image": "https://m.media-amazon.com/images/godfather.jpg",
          "aggregateRating": {"ratingValue": 9.2, "ratingCount": 2000000},
          "contentRating": "R",
          "genre": "Crime, Drama",
          "duration": "PT2H55M"
        }},
        {"@type": "ListItem", "position": 1, "item": {
          "@type": "Movie",
          "url": "/title/tt0111161/",
          "name": "The Shawshank Redemption",
          "description": "Released in 1994, two imprisoned men bond.",
          "aggregateRating": {"ratingValue": "9.3", "ratingCount": 2900000}
        }},
        {"@type": "ListItem", "position": 3, "item": {
          "@type": "Movie",
          "url": "https://www.imdb.com/title/tt0111161/",
          "name": "Duplicate Shawshank"
        }},
        {"@type": "ListItem", "position": 4, "item": {
          "@type": "Movie",
          "url": "https://www.imdb.com/title/tt0108052/",
          "name": "Schindler&apos;s List"
        }}
      ]
    }
    </script></head><body></body></html>"#;

    #[test]
    fn test_structured_tier_orders_by_position() {
        let records = parse_list(STRUCTURED_PAGE, &base(), 150).unwrap();

        let titles: Vec<_> = records.iter().map(|r| r.title.as_deref().unwrap()).collect();
        assert_eq!(
            titles,
            vec!["The Shawshank Redemption", "The Godfather", "Schindler's List"]
        );
        let ranks: Vec<_> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_structured_tier_maps_fields() {
        let records = parse_list(STRUCTURED_PAGE, &base(), 150).unwrap();

        let shawshank = &records[0];
        assert_eq!(shawshank.id.as_deref(), Some("tt0111161"));
        assert_eq!(
            shawshank.url.as_deref(),
            Some("https://www.imdb.com/title/tt0111161/")
        );
        assert_eq!(shawshank.year, Some(1994));
        assert_eq!(shawshank.rating, Some(9.3));
        assert_eq!(shawshank.rating_count, Some(2_900_000));

        let godfather = &records[1];
        assert_eq!(godfather.year, Some(1972));
        assert_eq!(godfather.certificate.as_deref(), Some("R"));
        assert_eq!(godfather.genres, vec!["Crime", "Drama"]);
        assert_eq!(godfather.runtime.as_deref(), Some("2h 55m"));
        assert_eq!(godfather.runtime_minutes, Some(175));
        assert_eq!(
            godfather.poster.as_deref(),
            Some("https://m.media-amazon.com/images/godfather.jpg")
        );
        assert!(records.iter().all(|r| !r.details_fetched));
    }

    #[test]
    fn test_truncates_to_catalog_size() {
        let records = parse_list(STRUCTURED_PAGE, &base(), 2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].rank, 2);
    }

    const MARKUP_PAGE: &str = r#"<html><body><ul>
    <li class="ipc-metadata-list-summary-item sc-1">
      <img class="ipc-image" src="https://m.media-amazon.com/images/shawshank.jpg">
      <a href="/title/tt0111161/?ref_=chttp_t_1"><h3 class="ipc-title__text">1. The Shawshank Redemption</h3></a>
      <span class="sc-x cli-title-metadata-item">1994</span>
      <span class="sc-x cli-title-metadata-item">2h 22m</span>
      <span class="sc-x cli-title-metadata-item">R</span>
      <span class="ipc-rating-star ipc-rating-star--imdb">9.3 (2.9M)</span>
    </li>
    <li class="ipc-metadata-list-summary-item sc-1">
      <div>No title here</div>
    </li>
    <li class="ipc-metadata-list-summary-item sc-1">
      <a href="/title/tt0068646/"><h3 class="ipc-title__text">2. The Godfather</h3></a>
      <span class="cli-title-metadata-item">1972</span>
      <span class="cli-title-metadata-item">2h 55m</span>
      <span class="ipc-rating-star">9.2</span>
    </li>
    </ul></body></html>"#;

    #[test]
    fn test_markup_tier_parses_list_items() {
        let records = parse_list(MARKUP_PAGE, &base(), 150).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.rank, 1);
        assert_eq!(first.title.as_deref(), Some("The Shawshank Redemption"));
        assert_eq!(first.id.as_deref(), Some("tt0111161"));
        assert_eq!(
            first.url.as_deref(),
            Some("https://www.imdb.com/title/tt0111161/?ref_=chttp_t_1")
        );
        assert_eq!(
            first.poster.as_deref(),
            Some("https://m.media-amazon.com/images/shawshank.jpg")
        );
        assert_eq!(first.year, Some(1994));
        assert_eq!(first.runtime.as_deref(), Some("2h 22m"));
        assert_eq!(first.runtime_minutes, Some(142));
        assert_eq!(first.certificate.as_deref(), Some("R"));
        assert_eq!(first.rating, Some(9.3));

        let second = &records[1];
        assert_eq!(second.rank, 2);
        assert_eq!(second.id.as_deref(), Some("tt0068646"));
        assert_eq!(second.rating, Some(9.2));
    }

    #[test]
    fn test_malformed_structured_block_falls_back() {
        let page = MARKUP_PAGE.replace(
            "<html><body>",
            r#"<html><head><script type="application/ld+json">{"itemListElement": </script></head><body>"#,
        );
        let records = parse_list(&page, &base(), 150).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_page_without_records_fails() {
        let result = parse_list("<html><body><p>Maintenance</p></body></html>", &base(), 150);
        assert!(matches!(result, Err(ParseFailure::NoRecords)));
    }
}
