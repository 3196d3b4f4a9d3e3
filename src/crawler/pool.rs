//! Concurrent detail fetcher
//!
//! Detail pages are fetched by tokio tasks bounded by a semaphore. Every task
//! owns a copy of exactly one record, so no two tasks ever touch the same
//! record; the caller's slice is only written after all tasks have joined.

use crate::catalog::Record;
use crate::crawler::detail_parser::parse_detail;
use crate::crawler::fetcher::fetch_page;
use crate::{ParseFailure, ReelError};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Completions between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Outcome counts for one detail batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records that were not yet detail-complete and were dispatched
    pub attempted: usize,

    /// Records whose detail page was fetched and parsed
    pub completed: usize,

    /// Records left incomplete by a fetch or task failure
    pub failed: usize,
}

impl BatchReport {
    /// Returns true if the batch had nothing to do
    pub fn is_noop(&self) -> bool {
        self.attempted == 0
    }
}

/// Fetches and parses one record's detail page
///
/// Cloned into every worker task; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct DetailFetcher {
    client: Client,
    delay: Duration,
    base_url: Url,
}

impl DetailFetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `delay` - Pause before every detail request
    /// * `base_url` - Site base used when a record has an id but no URL
    pub fn new(client: Client, delay: Duration, base_url: Url) -> Self {
        Self {
            client,
            delay,
            base_url,
        }
    }

    /// The detail page URL for a record
    ///
    /// Uses the record's own URL, or builds `/title/<id>/` from its id.
    pub fn detail_url(&self, record: &Record) -> Result<String, ParseFailure> {
        if let Some(url) = &record.url {
            return Ok(url.clone());
        }

        record
            .id
            .as_deref()
            .and_then(|id| self.base_url.join(&format!("/title/{id}/")).ok())
            .map(String::from)
            .ok_or(ParseFailure::MissingDetailUrl { rank: record.rank })
    }

    /// Fetches and parses the record's detail page in place
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The page was fetched and parsed
    /// * `Ok(false)` - The record was already complete and `force` was not set
    /// * `Err(ReelError)` - No URL could be built or the fetch failed; the
    ///   record is left unchanged
    pub async fn enrich(&self, record: &mut Record, force: bool) -> Result<bool, ReelError> {
        if record.details_fetched && !force {
            return Ok(false);
        }

        let url = self.detail_url(record)?;
        tokio::time::sleep(self.delay).await;
        let markup = fetch_page(&self.client, &url).await?;

        Ok(parse_detail(record, &markup, force))
    }
}

/// Completes every record in `records` that is not yet detail-complete
///
/// Records are dispatched to at most `concurrency` concurrent fetches. When no
/// record is pending this returns immediately without touching the network.
/// A failed record stays incomplete and does not affect its siblings.
///
/// # Arguments
///
/// * `fetcher` - The detail fetcher shared by all tasks
/// * `records` - Records to enrich in place
/// * `concurrency` - Maximum number of in-flight fetches, clamped to
///   between one and the number of pending records
///
/// # Returns
///
/// A `BatchReport` with attempted, completed and failed counts
pub async fn fetch_details_parallel(
    fetcher: &DetailFetcher,
    records: &mut [Record],
    concurrency: usize,
) -> BatchReport {
    let pending: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| !record.details_fetched)
        .map(|(index, _)| index)
        .collect();

    if pending.is_empty() {
        return BatchReport::default();
    }

    let total = pending.len();
    // More permits than pending records would never be used
    let permits = concurrency.clamp(1, total);
    tracing::info!(
        "Fetching details for {} records ({} concurrent)",
        total,
        permits
    );

    let semaphore = Arc::new(Semaphore::new(permits));
    let mut tasks = JoinSet::new();

    for index in pending {
        let fetcher = fetcher.clone();
        let semaphore = Arc::clone(&semaphore);
        let mut record = records[index].clone();

        tasks.spawn(async move {
            // The semaphore is never closed, so acquiring cannot fail
            let _permit = semaphore.acquire_owned().await.ok();
            let outcome = fetcher.enrich(&mut record, false).await;
            (index, record, outcome)
        });
    }

    let mut report = BatchReport {
        attempted: total,
        ..BatchReport::default()
    };
    let mut finished = Vec::with_capacity(total);
    let mut done = 0;

    while let Some(joined) = tasks.join_next().await {
        done += 1;
        match joined {
            Ok((index, record, Ok(_))) => {
                report.completed += 1;
                finished.push((index, record));
            }
            Ok((index, record, Err(e))) => {
                report.failed += 1;
                tracing::warn!("Details for rank {} not fetched: {}", record.rank, e);
                finished.push((index, record));
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!("Detail task failed: {}", e);
            }
        }

        if done % PROGRESS_INTERVAL == 0 || done == total {
            tracing::info!(
                "Details progress: {}/{} ({:.0}%)",
                done,
                total,
                done as f64 * 100.0 / total as f64
            );
        }
    }

    for (index, record) in finished {
        records[index] = record;
    }

    tracing::info!(
        "Detail batch finished: {} completed, {} failed",
        report.completed,
        report.failed
    );
    report
}
