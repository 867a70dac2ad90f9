//! Crawler coordinator - crawl orchestration
//!
//! Wires one crawl together:
//! - Resolves the root URL and the crawl domain
//! - Starts the frontier, the collectors and the worker pool
//! - Seeds the frontier with the root
//! - Waits for the completion detector, then joins the workers
//! - Reads every collector's snapshot into a [`CrawlResult`]

use crate::config::{validate, CompletionStrategy, Config};
use crate::crawler::collector::Collector;
use crate::crawler::completion::CompletionDetector;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::worker::{spawn_pool, RetryPolicy, WorkerContext};
use crate::url::{resolve_root, DomainScope};
use crate::TetherError;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};

/// Outcome of one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    /// Links that failed to resolve
    pub broken: Vec<String>,

    /// Links that answered with a success status
    pub working: Vec<String>,

    /// Links still rate limited after every retry
    pub rate_limited: Vec<String>,
}

impl CrawlResult {
    /// Returns true if no broken link was found
    pub fn is_clean(&self) -> bool {
        self.broken.is_empty()
    }

    /// Number of links that were classified
    pub fn total(&self) -> usize {
        self.broken.len() + self.working.len() + self.rate_limited.len()
    }
}

/// Main crawler structure
///
/// A crawler can run any number of crawls; each call to [`Crawler::crawl`] gets
/// its own frontier, collectors and workers. Only the fetcher is shared.
pub struct Crawler {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
}

impl Crawler {
    /// Creates a crawler that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(TetherError)` - The configuration is invalid or the HTTP client
    ///   could not be built
    pub fn new(config: Config) -> Result<Self, TetherError> {
        validate(&config)?;
        let fetcher = HttpFetcher::new(&config.http)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
        })
    }

    /// Creates a crawler on top of any fetcher
    ///
    /// Fails if the configuration does not pass validation.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, TetherError> {
        validate(&config)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }

    /// Crawls everything reachable from `root`
    ///
    /// Per-link failures end up in the result. The only error is a root URL that
    /// cannot be resolved to an absolute URL with a host.
    pub async fn crawl(&self, root: &str) -> Result<CrawlResult, TetherError> {
        let (root_url, domain) = resolve_root(root).map_err(|source| TetherError::InvalidRoot {
            url: root.to_string(),
            source,
        })?;

        let crawler_config = &self.config.crawler;
        let pool_size = crawler_config.pool_size();
        tracing::info!(
            "Crawling {} (domain {}, {} workers)",
            root_url,
            domain,
            pool_size
        );
        let start_time = Instant::now();

        let completion = CompletionDetector::new(crawler_config.completion);
        let (queue_tx, queue_rx) = mpsc::channel(crawler_config.queue_capacity);
        let (frontier, frontier_handle) = Frontier::spawn(queue_tx, completion.clone());

        let broken = Collector::spawn("broken");
        let working = Collector::spawn("working");
        let rate_limited = Collector::spawn("rate-limited");

        let ctx = Arc::new(WorkerContext {
            fetcher: self.fetcher.clone(),
            frontier: frontier.clone(),
            scope: DomainScope::new(domain, self.config.domain.include_www),
            broken: broken.clone(),
            working: working.clone(),
            rate_limited: rate_limited.clone(),
            completion: completion.clone(),
            retry: RetryPolicy {
                max_retries: crawler_config.rate_limit_retries,
                backoff: Duration::from_millis(crawler_config.rate_limit_backoff_ms),
            },
        });
        let workers = spawn_pool(pool_size, ctx.clone(), Arc::new(Mutex::new(queue_rx)));

        frontier.admit(root_url).await;

        let poller = match crawler_config.completion {
            CompletionStrategy::Polling => Some(
                completion.spawn_poller(Duration::from_millis(crawler_config.poll_interval_ms)),
            ),
            CompletionStrategy::Counter => None,
        };

        completion.wait().await;
        tracing::debug!("Stop signal received, joining {} workers", workers.len());

        for worker in workers {
            worker.await?;
        }
        if let Some(poller) = poller {
            poller.await?;
        }

        let result = CrawlResult {
            broken: broken.snapshot().await,
            working: working.snapshot().await,
            rate_limited: rate_limited.snapshot().await,
        };

        drop(ctx);
        drop(frontier);
        let visited = frontier_handle.await?;

        tracing::info!(
            "Crawl completed: {} links checked ({} working, {} broken, {} rate limited) in {:?}",
            visited,
            result.working.len(),
            result.broken.len(),
            result.rate_limited.len(),
            start_time.elapsed()
        );

        Ok(result)
    }
}
