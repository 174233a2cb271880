//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every tunable has a default, so an empty file (or no file at all)
//! describes a complete crawl.
//!
//! # Example
//!
//! ```no_run
//! use catalog_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawler.max_visits);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExtractConfig, FetchConfig, OutputConfig, OutputFormat,
    PolicyVariant, StatusPolicy, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
