use serde::Deserialize;

/// Main configuration structure for Tether
///
/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub domain: DomainConfig,
}

/// How the crawl decides that no work is left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStrategy {
    /// Stop the moment the outstanding-work counter reaches zero
    #[default]
    Counter,
    /// Probe the counter on a fixed interval and stop after two idle probes
    Polling,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Workers spawned per available CPU
    pub workers_per_core: usize,

    /// Explicit pool size, overrides `workers_per_core` when set
    pub workers: Option<usize>,

    /// Capacity of the bounded work queue
    pub queue_capacity: usize,

    /// Quiescence detection strategy
    pub completion: CompletionStrategy,

    /// Probe interval for the polling strategy (milliseconds)
    pub poll_interval_ms: u64,

    /// How many times a rate-limited link is re-queued before giving up
    pub rate_limit_retries: u32,

    /// Base delay before a rate-limited link is retried (milliseconds)
    pub rate_limit_backoff_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers_per_core: 8,
            workers: None,
            queue_capacity: 1024,
            completion: CompletionStrategy::Counter,
            poll_interval_ms: 1000,
            rate_limit_retries: 3,
            rate_limit_backoff_ms: 1000,
        }
    }
}

impl CrawlerConfig {
    /// Number of workers the pool should run
    pub fn pool_size(&self) -> usize {
        self.workers
            .unwrap_or_else(|| self.workers_per_core * num_cpus::get())
            .max(1)
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Redirects followed before the request fails
    pub max_redirects: usize,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_redirects: 10,
            user_agent: format!("tether/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Domain scoping configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DomainConfig {
    /// Treat `www.<host>` and `<host>` as the same site
    pub include_www: bool,
}
