//! In-memory fetcher for engine tests

use crate::crawler::fetcher::{is_html, FetchError, FetchedPage, Fetcher, HeadResponse};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct Calls {
    head: HashMap<String, usize>,
    get: HashMap<String, usize>,
}

struct Resource {
    status: u16,
    content_type: String,
    body: String,
}

/// Serves canned pages; unknown URLs answer 404
#[derive(Default)]
pub struct MockFetcher {
    resources: HashMap<String, Resource>,
    redirects: HashMap<String, String>,
    head_sequences: Mutex<HashMap<String, VecDeque<u16>>>,
    failing: HashSet<String>,
    calls: Mutex<Calls>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves an HTML `body` with `status` for both HEAD and GET
    pub fn page(self, url: &str, status: u16, body: &str) -> Self {
        self.resource(url, status, "text/html; charset=utf-8", body)
    }

    /// Serves `body` with an explicit content type
    pub fn resource(mut self, url: &str, status: u16, content_type: &str, body: &str) -> Self {
        self.resources.insert(
            url.to_string(),
            Resource {
                status,
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    /// Requests for `from` are answered by `to`, which also sees the request
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// HEAD answers these statuses first, then falls back to the page status
    pub fn head_sequence(self, url: &str, statuses: &[u16]) -> Self {
        self.head_sequences
            .lock()
            .unwrap()
            .insert(url.to_string(), statuses.iter().copied().collect());
        self
    }

    /// Every request to `url` fails at the transport level
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn head_calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().head.get(url).copied().unwrap_or(0)
    }

    pub fn get_calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get.get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.head.values().sum::<usize>() + calls.get.values().sum::<usize>()
    }

    /// Follows the redirect table, returning every URL requested on the way
    fn hops(&self, url: &str) -> Vec<String> {
        let mut hops = vec![url.to_string()];
        while let Some(next) = self.redirects.get(hops[hops.len() - 1].as_str()) {
            if hops.contains(next) {
                break;
            }
            hops.push(next.clone());
        }
        hops
    }

    fn check_transport(&self, url: &str) -> Result<(), FetchError> {
        if self.failing.contains(url) {
            return Err(FetchError::Connect {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn lookup(&self, url: &str) -> (u16, Option<String>, String) {
        match self.resources.get(url) {
            Some(resource) => (
                resource.status,
                Some(resource.content_type.clone()),
                resource.body.clone(),
            ),
            None => (404, None, String::new()),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_head(&self, url: &str) -> Result<HeadResponse, FetchError> {
        let hops = self.hops(url);
        {
            let mut calls = self.calls.lock().unwrap();
            for hop in &hops {
                *calls.head.entry(hop.clone()).or_default() += 1;
            }
        }
        let final_url = hops[hops.len() - 1].clone();
        self.check_transport(&final_url)?;

        let queued = self
            .head_sequences
            .lock()
            .unwrap()
            .get_mut(&final_url)
            .and_then(VecDeque::pop_front);
        let (status, content_type, _) = self.lookup(&final_url);
        Ok(HeadResponse {
            status: queued.unwrap_or(status),
            final_url,
            content_type,
        })
    }

    async fn fetch_body(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let hops = self.hops(url);
        {
            let mut calls = self.calls.lock().unwrap();
            for hop in &hops {
                *calls.get.entry(hop.clone()).or_default() += 1;
            }
        }
        let final_url = hops[hops.len() - 1].clone();
        self.check_transport(&final_url)?;

        let (status, content_type, body) = self.lookup(&final_url);
        let body = if is_html(content_type.as_deref()) {
            body
        } else {
            String::new()
        };
        Ok(FetchedPage {
            status,
            final_url,
            content_type,
            body,
        })
    }
}
