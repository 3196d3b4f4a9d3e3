//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and a temporary
//! directory for the cache file, and exercise the full list, detail, cache
//! and query cycle end-to-end.

use reel_ripple::cache::{CatalogCache, JsonFileCache};
use reel_ripple::config::{CacheConfig, Config, CrawlerConfig, UserAgentConfig};
use reel_ripple::{FilterCriteria, MovieCrawler, SortKey};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, cache_path: &Path, version: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            list_url: format!("{}/chart/top/", base_url),
            site_base_url: base_url.to_string(),
            catalog_size: 150,
            concurrency: 4,
            request_delay_ms: 0, // No pacing needed against the mock server
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            user_agent: "ReelRippleTest/1.0".to_string(),
            ..UserAgentConfig::default()
        },
        cache: CacheConfig {
            path: cache_path.display().to_string(),
            version: version.to_string(),
        },
    }
}

/// Ranked list page with an ItemList block of three titles
fn list_page(base_url: &str) -> String {
    format!(
        r#"<html><head><script type="application/ld+json">
        {{
          "@type": "ItemList",
          "itemListElement": [
            {{"@type": "ListItem", "position": 1, "item": {{
              "@type": "Movie", "url": "{base}/title/tt0111161/",
              "name": "The Shawshank Redemption",
              "description": "Two imprisoned men bond, 1994.",
              "aggregateRating": {{"ratingValue": 9.3, "ratingCount": 2900000}}
            }}}},
            {{"@type": "ListItem", "position": 2, "item": {{
              "@type": "Movie", "url": "{base}/title/tt0068646/",
              "name": "The Godfather",
              "description": "Crime dynasty saga from 1972.",
              "aggregateRating": {{"ratingValue": 9.2, "ratingCount": 2000000}}
            }}}},
            {{"@type": "ListItem", "position": 3, "item": {{
              "@type": "Movie", "url": "{base}/title/tt0468569/",
              "name": "The Dark Knight",
              "description": "Gotham, 2008.",
              "aggregateRating": {{"ratingValue": 9.0, "ratingCount": 2800000}}
            }}}}
          ]
        }}
        </script></head><body></body></html>"#,
        base = base_url
    )
}

/// Detail page with genre chips, origin and an awards line
fn detail_page(genres: &[&str], country: &str, awards: &str) -> String {
    let chips: String = genres
        .iter()
        .map(|g| format!(r#"<a class="ipc-chip"><span class="ipc-chip__text">{g}</span></a>"#))
        .collect();
    format!(
        r#"<html><body>
        <span data-testid="plot-xl">Plot for {country}</span>
        <div data-testid="genres">{chips}</div>
        <ul>
          <li data-testid="title-details-origin">
            <a class="ipc-metadata-list-item__list-content-item">{country}</a>
          </li>
        </ul>
        <li data-testid="award_information">{awards}</li>
        </body></html>"#
    )
}

async fn mount_list(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/chart/top/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page(&server.uri())))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/title/{}/", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_all_details(server: &MockServer) {
    mount_detail(
        server,
        "tt0111161",
        detail_page(&["Drama"], "United States", "Nominated for 7 Oscars"),
    )
    .await;
    mount_detail(
        server,
        "tt0068646",
        detail_page(&["Crime", "Drama"], "United States", "Won 3 Oscars"),
    )
    .await;
    mount_detail(
        server,
        "tt0468569",
        detail_page(&["Action", "Crime", "Drama"], "United Kingdom", "Won 2 Oscars"),
    )
    .await;
}

#[tokio::test]
async fn test_fetch_top_builds_ranked_catalog() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");
    let cache_path = temp.path().join("cache.json");

    mount_list(&server, 1).await;

    let config = create_test_config(&server.uri(), &cache_path, "1");
    let mut crawler = MovieCrawler::new(config).expect("Failed to create crawler");

    assert!(crawler.fetch_top(false).await);

    let records = crawler.catalog().records();
    assert_eq!(records.len(), 3);
    let ranks: Vec<u32> = records.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    let godfather = crawler.get_by_id("tt0068646").expect("Godfather indexed");
    assert_eq!(godfather.rank, 2);
    assert_eq!(godfather.year, Some(1972));
    assert_eq!(crawler.get_by_rank(3).and_then(|r| r.id.as_deref()), Some("tt0468569"));

    // The catalog was written through to disk
    assert!(cache_path.exists());
    let cached = JsonFileCache::new(&cache_path, "1").try_load().unwrap();
    assert_eq!(cached.len(), 3);
}

#[tokio::test]
async fn test_matching_cache_skips_network() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");
    let cache_path = temp.path().join("cache.json");

    // First run populates the cache
    {
        let first = MockServer::start().await;
        mount_list(&first, 1).await;
        let config = create_test_config(&first.uri(), &cache_path, "1");
        let mut crawler = MovieCrawler::new(config).unwrap();
        assert!(crawler.fetch_top(false).await);
    }

    // Second run must not touch the network at all
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &cache_path, "1");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);
    assert_eq!(crawler.catalog().len(), 3);
}

#[tokio::test]
async fn test_version_mismatch_refetches() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");
    let cache_path = temp.path().join("cache.json");

    mount_list(&server, 2).await;

    let config = create_test_config(&server.uri(), &cache_path, "1");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);

    let config = create_test_config(&server.uri(), &cache_path, "2");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);

    let envelope = JsonFileCache::new(&cache_path, "2").load();
    assert!(envelope.is_some());
}

#[tokio::test]
async fn test_force_refresh_ignores_cache() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");
    let cache_path = temp.path().join("cache.json");

    mount_list(&server, 2).await;

    let config = create_test_config(&server.uri(), &cache_path, "1");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);
    assert!(crawler.fetch_top(true).await);
}

#[tokio::test]
async fn test_list_page_failure_reports_false() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/chart/top/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &temp.path().join("cache.json"), "1");
    let mut crawler = MovieCrawler::new(config).unwrap();

    assert!(!crawler.fetch_top(false).await);
    assert!(crawler.catalog().is_empty());
    assert!(crawler.search("godfather").is_empty());
}

#[tokio::test]
async fn test_unparseable_list_page_reports_false() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/chart/top/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Down</body></html>"))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &temp.path().join("cache.json"), "1");
    let mut crawler = MovieCrawler::new(config).unwrap();

    assert!(!crawler.fetch_top(false).await);
}

#[tokio::test]
async fn test_detail_batch_enriches_and_persists() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");
    let cache_path = temp.path().join("cache.json");

    mount_list(&server, 1).await;
    mount_all_details(&server).await;

    let config = create_test_config(&server.uri(), &cache_path, "1");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);

    let report = crawler.fetch_all_details(2).await;
    assert_eq!(report.attempted, 3);
    assert_eq!(report.completed, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(crawler.catalog().detailed_count(), 3);

    let dark_knight = crawler.get_by_id("tt0468569").unwrap();
    assert_eq!(dark_knight.country.as_deref(), Some("United Kingdom"));
    assert_eq!(dark_knight.oscar_wins, Some(2));

    // Second batch has nothing to do (each detail mock expects exactly one call)
    let again = crawler.fetch_all_details(2).await;
    assert!(again.is_noop());

    // Details survive a reload from disk
    let reloaded = JsonFileCache::new(&cache_path, "1").try_load().unwrap();
    assert_eq!(reloaded.detailed_count(), 3);
    assert_eq!(
        reloaded.get_by_id("tt0068646").map(|r| r.genres.clone()),
        Some(vec!["Crime".to_string(), "Drama".to_string()])
    );
}

#[tokio::test]
async fn test_rank_range_batch_only_touches_range() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");

    mount_list(&server, 1).await;
    mount_detail(
        &server,
        "tt0068646",
        detail_page(&["Crime", "Drama"], "United States", "Won 3 Oscars"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/title/tt0111161/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &temp.path().join("cache.json"), "1");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);

    let report = crawler.fetch_details_parallel(2..=2, 4).await;
    assert_eq!(report.attempted, 1);
    assert!(crawler.get_by_rank(2).unwrap().details_fetched);
    assert!(!crawler.get_by_rank(1).unwrap().details_fetched);

    let empty = crawler.fetch_details_parallel(40..=50, 4).await;
    assert!(empty.is_noop());
}

#[tokio::test]
async fn test_partial_failure_leaves_record_incomplete() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");

    mount_list(&server, 1).await;
    mount_detail(
        &server,
        "tt0111161",
        detail_page(&["Drama"], "United States", "Nominated for 7 Oscars"),
    )
    .await;
    mount_detail(
        &server,
        "tt0468569",
        detail_page(&["Action"], "United Kingdom", "Won 2 Oscars"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/title/tt0068646/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &temp.path().join("cache.json"), "1");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);

    let report = crawler.fetch_all_details(4).await;
    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 1);

    let godfather = crawler.get_by_id("tt0068646").unwrap();
    assert!(!godfather.details_fetched);
    assert_eq!(godfather.title.as_deref(), Some("The Godfather"));
    assert_eq!(godfather.rating, Some(9.2));
}

#[tokio::test]
async fn test_genre_filter_completes_details_first() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");

    mount_list(&server, 1).await;
    mount_all_details(&server).await;

    let config = create_test_config(&server.uri(), &temp.path().join("cache.json"), "1");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);
    assert_eq!(crawler.catalog().detailed_count(), 0);

    let criteria = FilterCriteria {
        genres: vec!["crime".to_string()],
        ..FilterCriteria::default()
    };
    let ids: Vec<String> = crawler
        .filter(&criteria)
        .await
        .iter()
        .filter_map(|r| r.id.clone())
        .collect();
    assert_eq!(ids, vec!["tt0068646", "tt0468569"]);
    assert_eq!(crawler.catalog().detailed_count(), 3);

    // Rating-only filters never fetch
    let criteria = FilterCriteria {
        min_rating: Some(9.2),
        ..FilterCriteria::default()
    };
    assert_eq!(crawler.filter(&criteria).await.len(), 2);

    let winners: Vec<u32> = crawler.oscar_winners().iter().map(|r| r.rank).collect();
    assert_eq!(winners, vec![2, 3]);

    let lowest_rated_first = crawler.sort_by(SortKey::Rating, false);
    assert_eq!(lowest_rated_first[0].rank, 3);
}

#[tokio::test]
async fn test_shutdown_persists_catalog() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("Failed to create temp dir");
    let cache_path = temp.path().join("cache.json");

    mount_list(&server, 1).await;
    mount_detail(
        &server,
        "tt0111161",
        detail_page(&["Drama"], "United States", "Nominated for 7 Oscars"),
    )
    .await;

    let config = create_test_config(&server.uri(), &cache_path, "1");
    let mut crawler = MovieCrawler::new(config).unwrap();
    assert!(crawler.fetch_top(false).await);

    let record = crawler.details_for_id("tt0111161", false).await.unwrap();
    assert_eq!(record.plot.as_deref(), Some("Plot for United States"));

    std::fs::remove_file(&cache_path).unwrap();
    crawler.shutdown();

    let cached = JsonFileCache::new(&cache_path, "1").try_load().unwrap();
    assert_eq!(
        cached.get_by_id("tt0111161").map(|r| r.details_fetched),
        Some(true)
    );
}
