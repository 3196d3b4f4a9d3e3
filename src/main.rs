//! Reel-Ripple main entry point
//!
//! This is the command-line interface for the Reel-Ripple movie-chart crawler.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use reel_ripple::catalog::query::{self, parse_genre_list};
use reel_ripple::config::{load_config_with_hash, validate, Config};
use reel_ripple::output::{compute_statistics, print_statistics};
use reel_ripple::{FilterCriteria, MovieCrawler, Record, SortKey};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Reel-Ripple: A polite movie-chart crawler
///
/// Reel-Ripple fetches a ranked movie chart, enriches each title from its
/// detail page with bounded concurrency and caches the catalog on disk so
/// repeat runs skip the network.
#[derive(Parser, Debug)]
#[command(name = "reel-ripple")]
#[command(version)]
#[command(about = "A polite movie-chart crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Ignore the cache and re-fetch the ranked list
    #[arg(long)]
    refresh: bool,

    /// Fetch detail pages for every record before answering
    #[arg(long)]
    details: bool,

    /// Show one record by id, fetching its detail page if needed
    #[arg(long, value_name = "ID")]
    id: Option<String>,

    /// Case-insensitive search across title, genres, country and language
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Only titles containing this keyword
    #[arg(long)]
    keyword: Option<String>,

    /// Comma-separated genres, e.g. "Action, Sci-Fi"
    #[arg(long, value_name = "GENRES")]
    genre: Option<String>,

    #[arg(long)]
    year_start: Option<i32>,

    #[arg(long)]
    year_end: Option<i32>,

    #[arg(long)]
    min_rating: Option<f64>,

    #[arg(long)]
    max_rating: Option<f64>,

    #[arg(long)]
    rank_start: Option<u32>,

    #[arg(long)]
    rank_end: Option<u32>,

    /// Order of the printed records
    #[arg(long, value_enum)]
    sort: Option<SortOrder>,

    /// Reverse the default direction of --sort (A-Z for alpha, highest first otherwise)
    #[arg(long, requires = "sort")]
    reverse: bool,

    /// Only records that won at least one Oscar
    #[arg(long)]
    oscars: bool,

    /// Maximum number of records to print
    #[arg(long, default_value_t = 25)]
    limit: usize,

    /// Show catalog statistics and exit
    #[arg(long)]
    stats: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortOrder {
    Alpha,
    Rating,
    Year,
    BoxOffice,
    Oscars,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    let criteria = build_criteria(&cli)?;
    let concurrency = config.crawler.concurrency;
    let mut crawler = MovieCrawler::new(config).context("Failed to initialize crawler")?;

    if !crawler.fetch_top(cli.refresh).await {
        bail!("Could not load the ranked list from cache or network");
    }

    if cli.details {
        let report = crawler.fetch_all_details(concurrency).await;
        tracing::info!(
            "Details: {} attempted, {} completed, {} failed",
            report.attempted,
            report.completed,
            report.failed
        );
    }

    if let Some(id) = &cli.id {
        let Some(record) = crawler.details_for_id(id, cli.refresh).await else {
            bail!("No record with id {}", id);
        };
        println!("{}", serde_json::to_string_pretty(record)?);
    } else if cli.stats {
        print_statistics(&compute_statistics(crawler.catalog()));
    } else if let Some(term) = &cli.search {
        print_records(&crawler.search(term), cli.limit);
    } else {
        let mut records = if criteria.is_empty() {
            crawler.catalog().records().iter().collect()
        } else {
            crawler.filter(&criteria).await
        };

        if cli.oscars {
            records = query::oscar_winners(records);
        }

        if let Some(order) = cli.sort {
            records = match order {
                SortOrder::Alpha => {
                    let mut sorted = query::sort_alphabetical(records);
                    if cli.reverse {
                        sorted.reverse();
                    }
                    sorted
                }
                SortOrder::Rating => query::sort_by(records, SortKey::Rating, !cli.reverse),
                SortOrder::Year => query::sort_by(records, SortKey::Year, !cli.reverse),
                SortOrder::BoxOffice => {
                    query::sort_by(records, SortKey::BoxOffice, !cli.reverse)
                }
                SortOrder::Oscars => query::sort_by(records, SortKey::OscarWins, !cli.reverse),
            };
        }

        print_records(&records, cli.limit);
    }

    crawler.shutdown();
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reel_ripple=info,warn"),
            1 => EnvFilter::new("reel_ripple=debug,info"),
            2 => EnvFilter::new("reel_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Collects the filter flags, validating every requested genre
fn build_criteria(cli: &Cli) -> anyhow::Result<FilterCriteria> {
    let genres = match &cli.genre {
        Some(list) => parse_genre_list(list)?,
        None => Vec::new(),
    };

    Ok(FilterCriteria {
        keyword: cli.keyword.clone(),
        year_start: cli.year_start,
        year_end: cli.year_end,
        min_rating: cli.min_rating,
        max_rating: cli.max_rating,
        rank_start: cli.rank_start,
        rank_end: cli.rank_end,
        genres,
    })
}

/// Handles the --dry-run mode: validates and shows the effective configuration
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    validate(config).context("Configuration is invalid")?;

    println!("=== Reel-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  List URL: {}", config.crawler.list_url);
    println!("  Site base URL: {}", config.crawler.site_base_url);
    println!("  Catalog size: {}", config.crawler.catalog_size);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nHeaders:");
    println!("  User-Agent: {}", config.user_agent.user_agent);
    println!("  Accept-Language: {}", config.user_agent.accept_language);

    println!("\nCache:");
    println!("  Path: {}", config.cache.path);
    println!("  Version: {}", config.cache.version);

    println!("\n✓ Configuration is valid");
    Ok(())
}

fn print_records(records: &[&Record], limit: usize) {
    if records.is_empty() {
        println!("No matching records.");
        return;
    }

    for record in records.iter().take(limit) {
        let year = record
            .year
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        let rating = record
            .rating
            .map(|r| format!("  ★ {:.1}", r))
            .unwrap_or_default();
        let genres = if record.genres.is_empty() {
            String::new()
        } else {
            format!("  [{}]", record.genres.join(", "))
        };
        println!(
            "{:>4}. {}{}{}{}",
            record.rank,
            record.title.as_deref().unwrap_or("(untitled)"),
            year,
            rating,
            genres
        );
    }

    if records.len() > limit {
        println!("... and {} more", records.len() - limit);
    }
}
