//! Configuration module for Tether
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A crawl can also run without any file: `Config::default()` is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use tether::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tether.toml")).unwrap();
//! println!("Crawler will run {} workers", config.crawler.pool_size());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CompletionStrategy, Config, CrawlerConfig, DomainConfig, HttpConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
