//! Reel-Ripple: a polite movie-chart crawler
//!
//! This crate fetches a ranked movie chart, extracts a canonical catalog of
//! records, enriches them concurrently from per-title detail pages and keeps
//! the result in a versioned disk cache so repeat runs skip the network.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;

use thiserror::Error;

/// Main error type for Reel-Ripple operations
#[derive(Debug, Error)]
pub enum ReelError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchFailure),

    #[error("Parse failed: {0}")]
    Parse(#[from] ParseFailure),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheFailure),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Network or HTTP status failure for a single page request
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchFailure {
    /// The URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Network { url, .. }
            | Self::Body { url, .. } => url,
        }
    }
}

/// Malformed or unexpected markup
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("No records could be extracted from the list page")]
    NoRecords,

    #[error("Record at rank {rank} has neither a detail URL nor an id")]
    MissingDetailUrl { rank: u32 },

    #[error("Malformed structured data: {0}")]
    JsonLd(String),
}

/// Unreadable, mismatched or unwritable cache
#[derive(Debug, Error)]
pub enum CacheFailure {
    #[error("Cache file not found: {0}")]
    Missing(String),

    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while building queries from user input
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown genre: {0}")]
    UnknownGenre(String),
}

/// Result type alias for Reel-Ripple operations
pub type Result<T> = std::result::Result<T, ReelError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{CacheEnvelope, CatalogCache, JsonFileCache};
pub use catalog::query::{FilterCriteria, SortKey};
pub use catalog::{CastMember, Catalog, Record};
pub use config::Config;
pub use crawler::{BatchReport, MovieCrawler};
