//! Worker pool
//!
//! A fixed number of tasks pull work items from the shared queue. For each URL
//! a worker:
//! 1. Sends a HEAD request and classifies the answer
//! 2. Records the URL with the broken or working collector
//! 3. For reachable HTML pages that end up on the crawl domain after
//!    redirects, GETs the body and offers every link found there to the
//!    frontier
//!
//! Rate-limited URLs are never recorded as broken. They are re-queued after a
//! linear backoff until their retries run out.

use crate::crawler::classifier::{classify, classify_status};
use crate::crawler::collector::Collector;
use crate::crawler::completion::{wait_for_stop, CompletionDetector};
use crate::crawler::fetcher::{is_html, Fetcher, HeadResponse};
use crate::crawler::frontier::{Frontier, WorkItem};
use crate::crawler::parser::extract_links;
use crate::state::LinkState;
use crate::url::{canonicalize, DomainScope};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// The receiving end of the work queue, shared by every worker
pub type SharedQueue = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

/// Retry policy for rate-limited links
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries before a link is given up on
    pub max_retries: u32,

    /// Delay before the first retry; later retries wait proportionally longer
    pub backoff: Duration,
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff * (attempt + 1)
    }
}

/// Everything a worker needs, shared by the whole pool
pub struct WorkerContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub frontier: Frontier,
    pub scope: DomainScope,
    pub broken: Collector,
    pub working: Collector,
    pub rate_limited: Collector,
    pub completion: CompletionDetector,
    pub retry: RetryPolicy,
}

/// Spawns `size` workers on the current runtime
pub fn spawn_pool(size: usize, ctx: Arc<WorkerContext>, queue: SharedQueue) -> Vec<JoinHandle<()>> {
    (0..size)
        .map(|id| tokio::spawn(run_worker(id, ctx.clone(), queue.clone())))
        .collect()
}

async fn run_worker(id: usize, ctx: Arc<WorkerContext>, queue: SharedQueue) {
    let mut stop = ctx.completion.subscribe();
    let mut processed = 0usize;

    loop {
        let item = tokio::select! {
            biased;
            _ = wait_for_stop(&mut stop) => break,
            item = next_item(&queue) => match item {
                Some(item) => item,
                None => break,
            },
        };

        ctx.process(item).await;
        processed += 1;
        ctx.completion.work_done();
    }

    tracing::trace!("Worker {} exiting after {} items", id, processed);
}

async fn next_item(queue: &SharedQueue) -> Option<WorkItem> {
    queue.lock().await.recv().await
}

impl WorkerContext {
    /// Classifies one URL and routes it to the right collector
    pub async fn process(&self, item: WorkItem) {
        let outcome = self.fetcher.fetch_head(&item.url).await;
        if let Err(e) = &outcome {
            tracing::debug!("HEAD failed: {}", e);
        }

        let state = classify(&outcome);
        tracing::debug!("{} is {}", item.url, state);

        match state {
            LinkState::Unreachable => self.broken.record(item.url).await,
            LinkState::RateLimited => self.retry_later(item).await,
            LinkState::Reachable => {
                self.working.record(item.url.clone()).await;
                if matches!(&outcome, Ok(head) if self.should_follow(head)) {
                    self.follow_links(&item.url).await;
                }
            }
        }
    }

    /// Only HTML pages that end up on the crawled site are fetched in full
    fn should_follow(&self, head: &HeadResponse) -> bool {
        if !self.scope.contains(&head.final_url) {
            return false;
        }
        if !is_html(head.content_type.as_deref()) {
            tracing::debug!(
                "Not following {}: content type {}",
                head.final_url,
                head.content_type.as_deref().unwrap_or_default()
            );
            return false;
        }
        true
    }

    /// GETs an in-domain page and offers its links to the frontier
    async fn follow_links(&self, url: &str) {
        let page = match self.fetcher.fetch_body(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!("GET failed, no links followed: {}", e);
                return;
            }
        };

        if classify_status(page.status) != LinkState::Reachable {
            tracing::debug!("GET {} answered {}, no links followed", url, page.status);
            return;
        }

        // The GET may have been redirected somewhere the HEAD was not
        if !self.scope.contains(&page.final_url) || !page.is_html() {
            tracing::debug!("GET {} ended at {}, no links followed", url, page.final_url);
            return;
        }

        let domain = self.scope.domain();
        let mut offered = 0;
        for raw in extract_links(&page.body) {
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            self.frontier.offer(canonicalize(raw, domain));
            offered += 1;
        }

        tracing::debug!("Offered {} links from {}", offered, url);
    }

    async fn retry_later(&self, item: WorkItem) {
        if item.attempt >= self.retry.max_retries {
            tracing::warn!(
                "{} still rate limited after {} retries",
                item.url,
                item.attempt
            );
            self.rate_limited.record(item.url).await;
            return;
        }

        let delay = self.retry.delay_for(item.attempt);
        tracing::info!("{} rate limited, retrying in {:?}", item.url, delay);

        // Counted now so the crawl cannot finish while the retry is sleeping
        self.completion.work_added();
        let frontier = self.frontier.clone();
        let next = item.next_attempt();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            frontier.requeue(next);
        });
    }
}
