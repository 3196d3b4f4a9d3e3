//! Crawler module for list and detail page processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed header profile
//! - Ranked list parsing (structured data first, markup second)
//! - Detail page parsing with per-field fallbacks
//! - The bounded concurrent detail fetcher
//! - Overall coordination through `MovieCrawler`

mod coordinator;
mod detail_parser;
mod fetcher;
mod list_parser;
mod markup;
mod pool;

pub use coordinator::MovieCrawler;
pub use detail_parser::{parse_detail, MAX_CAST};
pub use fetcher::{build_http_client, fetch_page};
pub use list_parser::parse_list;
pub use pool::{fetch_details_parallel, BatchReport, DetailFetcher};
