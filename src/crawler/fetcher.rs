//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with a browser-like header profile
//! - Single-attempt GET requests for list and detail pages
//! - Error classification into `FetchFailure`
//!
//! There is no retry policy. Callers decide whether a missing page is fatal.

use crate::config::UserAgentConfig;
use crate::FetchFailure;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;

/// Upper bound for establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent and header configuration
/// * `timeout` - Whole-request timeout applied to every fetch
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use reel_ripple::config::UserAgentConfig;
/// use reel_ripple::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, ACCEPT, &config.accept);
    insert_header(&mut headers, ACCEPT_LANGUAGE, &config.accept_language);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

fn insert_header(headers: &mut HeaderMap, name: reqwest::header::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!("Skipping invalid {} header value", name),
    }
}

/// Fetches a page body with a single GET request
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// * `Ok(String)` - The response body of a 2xx response
/// * `Err(FetchFailure)` - The classified network or status failure
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchFailure> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchFailure::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchFailure::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })
}

/// Maps a transport-level reqwest error onto the failure taxonomy
fn classify_error(url: &str, error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchFailure::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchFailure::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
