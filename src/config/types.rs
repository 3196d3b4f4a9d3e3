use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_LIST_URL: &str = "https://www.imdb.com/chart/top/";
pub const DEFAULT_SITE_BASE_URL: &str = "https://www.imdb.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Main configuration structure for Reel-Ripple
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Ranked list page to crawl
    pub list_url: String,

    /// Base URL used to resolve relative title links
    pub site_base_url: String,

    /// Maximum number of records kept from the list page
    pub catalog_size: usize,

    /// Width of the detail-fetch worker pool
    pub concurrency: usize,

    /// Delay applied before every detail page request (milliseconds)
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            list_url: DEFAULT_LIST_URL.to_string(),
            site_base_url: DEFAULT_SITE_BASE_URL.to_string(),
            catalog_size: 150,
            concurrency: 10,
            request_delay_ms: 300,
            request_timeout_secs: 15,
        }
    }
}

/// Header profile sent with every request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserAgentConfig {
    /// Value of the User-Agent header
    pub user_agent: String,

    /// Value of the Accept header
    pub accept: String,

    /// Value of the Accept-Language header
    pub accept_language: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

/// Disk cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Path to the JSON cache file
    pub path: String,

    /// Version tag written into the envelope; a different tag invalidates the file
    pub version: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: "reel_ripple_cache.json".to_string(),
            version: "1".to_string(),
        }
    }
}
