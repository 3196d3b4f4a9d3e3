//! Configuration module for Reel-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing file section falls back to the
//! built-in chart settings.
//!
//! # Example
//!
//! ```no_run
//! use reel_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("reel-ripple.toml")).unwrap();
//! println!("Detail concurrency: {}", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CacheConfig, Config, CrawlerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
