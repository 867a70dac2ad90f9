//! Crawler module for link checking
//!
//! This module contains the crawl engine:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML link extraction
//! - The frontier that deduplicates URLs and feeds the work queue
//! - Result collectors and completion detection
//! - The worker pool and overall crawl coordination

mod classifier;
mod collector;
mod completion;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod worker;

#[cfg(test)]
mod mock;

pub use classifier::{classify, classify_status};
pub use collector::Collector;
pub use completion::CompletionDetector;
pub use coordinator::{CrawlResult, Crawler};
pub use fetcher::{
    build_http_client, is_html, FetchError, FetchedPage, Fetcher, HeadResponse, HttpFetcher,
};
pub use frontier::{Frontier, WorkItem};
pub use parser::extract_links;

use crate::config::Config;
use crate::TetherError;

/// Crawls `root` with the default configuration
///
/// This is the main entry point for a one-off check. It will:
/// 1. Resolve the root URL and its domain
/// 2. HEAD-check every link reachable from the root
/// 3. Follow links found on reachable pages of the root's domain
/// 4. Return the broken, working and rate-limited links
///
/// # Arguments
///
/// * `root` - The URL to start from; a missing scheme means `https://`
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed; broken links are part of the result
/// * `Err(TetherError)` - The root URL was unusable or the HTTP client failed to build
pub async fn crawl(root: &str) -> Result<CrawlResult, TetherError> {
    Crawler::new(Config::default())?.crawl(root).await
}
