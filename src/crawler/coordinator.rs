//! Crawler coordinator - the movie catalog service
//!
//! `MovieCrawler` owns the configuration, the shared HTTP client, the catalog
//! and its cache. It is the single writer of the catalog: list replacement,
//! detail batches and cache writes all go through `&mut self`, while the
//! query operations read the current snapshot through `&self`.

use crate::cache::{CatalogCache, JsonFileCache};
use crate::catalog::query::{self, FilterCriteria, SortKey};
use crate::catalog::{Catalog, Record};
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::list_parser::parse_list;
use crate::crawler::pool::{fetch_details_parallel, BatchReport, DetailFetcher};
use crate::{ConfigError, Result};
use reqwest::Client;
use std::ops::RangeInclusive;
use url::Url;

/// Movie catalog crawler and query service
pub struct MovieCrawler {
    config: Config,
    client: Client,
    base_url: Url,
    fetcher: DetailFetcher,
    catalog: Catalog,
    cache: Box<dyn CatalogCache + Send + Sync>,
}

impl MovieCrawler {
    /// Creates a crawler backed by the configured JSON file cache
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(MovieCrawler)` - Crawler with an empty catalog
    /// * `Err(ReelError)` - The site base URL is invalid or the HTTP client
    ///   could not be built
    pub fn new(config: Config) -> Result<Self> {
        let cache = JsonFileCache::from_config(&config.cache);
        Self::with_cache(config, Box::new(cache))
    }

    /// Creates a crawler backed by an arbitrary cache implementation
    pub fn with_cache(config: Config, cache: Box<dyn CatalogCache + Send + Sync>) -> Result<Self> {
        let base_url = Url::parse(&config.crawler.site_base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("{}: {}", config.crawler.site_base_url, e))
        })?;
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        let fetcher = DetailFetcher::new(
            client.clone(),
            config.crawler.request_delay(),
            base_url.clone(),
        );

        Ok(Self {
            config,
            client,
            base_url,
            fetcher,
            catalog: Catalog::new(),
            cache,
        })
    }

    /// Populates the catalog from the cache or the ranked list page
    ///
    /// Unless `force_refresh` is set, a valid non-empty cache is used and no
    /// request is made. Otherwise the list page is fetched and parsed, the
    /// catalog is replaced and the cache rewritten.
    ///
    /// # Returns
    ///
    /// `true` if the catalog was populated. `false` if the list page could not
    /// be fetched or yielded no records; the previous catalog is kept.
    pub async fn fetch_top(&mut self, force_refresh: bool) -> bool {
        if !force_refresh {
            if let Some(catalog) = self.cache.load() {
                if !catalog.is_empty() {
                    self.catalog = catalog;
                    return true;
                }
            }
        }

        let list_url = &self.config.crawler.list_url;
        tracing::info!("Fetching ranked list from {}", list_url);

        let markup = match fetch_page(&self.client, list_url).await {
            Ok(markup) => markup,
            Err(e) => {
                tracing::error!("Failed to fetch ranked list: {}", e);
                return false;
            }
        };

        let records = match parse_list(&markup, &self.base_url, self.config.crawler.catalog_size) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Failed to parse ranked list: {}", e);
                return false;
            }
        };

        tracing::info!("Parsed {} records from ranked list", records.len());
        self.catalog.replace(records);
        self.cache.save(&self.catalog);
        true
    }

    /// Completes details for records whose rank falls in `ranks`
    ///
    /// The cache is rewritten if any record was dispatched.
    pub async fn fetch_details_parallel(
        &mut self,
        ranks: RangeInclusive<u32>,
        concurrency: usize,
    ) -> BatchReport {
        let records = self.catalog.records();
        let start = records.iter().position(|r| ranks.contains(&r.rank));
        let end = records.iter().rposition(|r| ranks.contains(&r.rank));
        let (Some(start), Some(end)) = (start, end) else {
            return BatchReport::default();
        };

        self.run_batch(start..=end, concurrency).await
    }

    /// Completes details for every record in the catalog
    pub async fn fetch_all_details(&mut self, concurrency: usize) -> BatchReport {
        if self.catalog.is_empty() {
            return BatchReport::default();
        }
        let last = self.catalog.len() - 1;
        self.run_batch(0..=last, concurrency).await
    }

    async fn run_batch(&mut self, positions: RangeInclusive<usize>, concurrency: usize) -> BatchReport {
        let slice = &mut self.catalog.records_mut()[positions];
        let report = fetch_details_parallel(&self.fetcher, slice, concurrency).await;
        if !report.is_noop() {
            self.cache.save(&self.catalog);
        }
        report
    }

    /// Fetches one record's detail page on demand
    ///
    /// # Arguments
    ///
    /// * `id` - The record id
    /// * `force` - Re-fetch even if the record is already detail-complete
    ///
    /// # Returns
    ///
    /// The record after the attempt, or `None` if no record has this id.
    /// A failed fetch is logged and the record returned as it was.
    pub async fn details_for_id(&mut self, id: &str, force: bool) -> Option<&Record> {
        let position = self.catalog.position_of(id)?;
        let record = self.catalog.records_mut().get_mut(position)?;

        match self.fetcher.enrich(record, force).await {
            Ok(true) => self.cache.save(&self.catalog),
            Ok(false) => tracing::debug!("Details for {} already present", id),
            Err(e) => tracing::warn!("Details for {} not fetched: {}", id, e),
        }

        self.catalog.records().get(position)
    }

    /// Records matching every criterion
    ///
    /// A genre criterion first completes details for the whole catalog, since
    /// genres are only known from detail pages.
    pub async fn filter(&mut self, criteria: &FilterCriteria) -> Vec<&Record> {
        if criteria.requires_details() {
            let concurrency = self.config.crawler.concurrency;
            self.fetch_all_details(concurrency).await;
        }
        query::filter(self.catalog.records(), criteria)
    }

    /// Case-insensitive literal search over title, genres, country and language
    pub fn search(&self, term: &str) -> Vec<&Record> {
        query::search(self.catalog.records(), term)
    }

    /// All records ordered by title
    pub fn sorted_alphabetical(&self) -> Vec<&Record> {
        query::sort_alphabetical(self.catalog.records())
    }

    /// All records ordered by a numeric key
    pub fn sort_by(&self, key: SortKey, descending: bool) -> Vec<&Record> {
        query::sort_by(self.catalog.records(), key, descending)
    }

    /// Highest rated records first
    pub fn trending(&self, limit: usize) -> Vec<&Record> {
        let mut records = self.sort_by(SortKey::Rating, true);
        records.truncate(limit);
        records
    }

    /// Most recent records first
    pub fn new_arrivals(&self, limit: usize) -> Vec<&Record> {
        let mut records = self.sort_by(SortKey::Year, true);
        records.truncate(limit);
        records
    }

    /// Records with at least one Oscar win, most wins first
    pub fn oscar_winners(&self) -> Vec<&Record> {
        query::oscar_winners(self.catalog.records())
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Record> {
        self.catalog.get_by_id(id)
    }

    pub fn get_by_rank(&self, rank: u32) -> Option<&Record> {
        self.catalog.get_by_rank(rank)
    }

    /// The current catalog snapshot
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Persists the catalog and releases the crawler
    pub fn shutdown(self) {
        if !self.catalog.is_empty() {
            self.cache.save(&self.catalog);
        }
        tracing::info!("Crawler shut down with {} records", self.catalog.len());
    }
}
