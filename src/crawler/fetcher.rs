//! HTTP fetcher implementation
//!
//! The crawl engine only ever asks two questions of the network:
//! - HEAD: what status does this URL answer with, where did it end up after
//!   redirects, and what kind of content is it?
//! - GET: what status and body does this page have?
//!
//! Both are behind the [`Fetcher`] trait so the engine can be driven by something
//! other than a real HTTP client. [`HttpFetcher`] is the `reqwest` implementation.

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure for one request
///
/// Every variant classifies the link as unreachable. None of them is retried
/// within a single classification.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// Classifies a `reqwest` error for the given URL
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            FetchError::Timeout { url }
        } else if error.is_redirect() {
            FetchError::RedirectLimit { url }
        } else if error.is_connect() {
            FetchError::Connect {
                url,
                message: error.to_string(),
            }
        } else {
            FetchError::Request {
                url,
                message: error.to_string(),
            }
        }
    }
}

/// Returns true if a Content-Type names an HTML document
///
/// A missing header is given the benefit of the doubt.
pub fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        Some(content_type) => {
            let content_type = content_type.to_ascii_lowercase();
            content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
        }
        None => true,
    }
}

/// The answer to a HEAD request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResponse {
    /// HTTP status code
    pub status: u16,

    /// URL the request ended at after following redirects
    pub final_url: String,

    /// Content-Type header, if the server sent one
    pub content_type: Option<String>,
}

/// A page fetched with GET
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// URL the request ended at after following redirects
    pub final_url: String,

    /// Content-Type header, if the server sent one
    pub content_type: Option<String>,

    /// Response body as text; left empty when the content is not HTML
    pub body: String,
}

impl FetchedPage {
    /// Returns true if the body is an HTML document worth parsing
    pub fn is_html(&self) -> bool {
        is_html(self.content_type.as_deref())
    }
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The transport seam of the crawl engine
///
/// Implementations must be safe to share between all workers of a crawl.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Sends a HEAD request and returns status, final URL and content type
    ///
    /// Any response body is released before this returns.
    async fn fetch_head(&self, url: &str) -> Result<HeadResponse, FetchError>;

    /// Sends a GET request and returns status and body
    ///
    /// The body is only read when the response is HTML.
    async fn fetch_body(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with the configured limits
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let redirect = if config.max_redirects == 0 {
        Policy::none()
    } else {
        Policy::limited(config.max_redirects)
    };

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// `reqwest`-backed fetcher
///
/// The client keeps its own connection pool and is cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::from_client(build_http_client(config)?))
    }

    /// Wraps an existing client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_head(&self, url: &str) -> Result<HeadResponse, FetchError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        // Dropping the response releases the connection back to the pool
        Ok(HeadResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
            content_type: content_type_of(&response),
        })
    }

    async fn fetch_body(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = content_type_of(&response);

        if !is_html(content_type.as_deref()) {
            tracing::debug!(
                "Not reading {} body of {}",
                content_type.as_deref().unwrap_or_default(),
                final_url
            );
            return Ok(FetchedPage {
                status,
                final_url,
                content_type,
                body: String::new(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(FetchedPage {
            status,
            final_url,
            content_type,
            body,
        })
    }
}
