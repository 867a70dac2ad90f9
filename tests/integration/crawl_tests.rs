//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use std::time::Duration;
use tether::config::{CompletionStrategy, Config};
use tether::{Crawler, TetherError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a small, fast configuration for local crawls
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.workers = Some(4);
    config.crawler.queue_capacity = 16;
    config.crawler.poll_interval_ms = 20;
    config.crawler.rate_limit_retries = 1;
    config.crawler.rate_limit_backoff_ms = 10;
    config.http.timeout_secs = 2;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html")
}

async fn mount_head(server: &MockServer, page: &str, status: u16, times: u64) {
    Mock::given(method("HEAD"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_get(server: &MockServer, page: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

fn sorted(mut links: Vec<String>) -> Vec<String> {
    links.sort();
    links
}

#[tokio::test]
async fn test_self_linking_page_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/", 200, 1).await;
    mount_get(&server, "/", &format!(r#"<a href="{}/">Home</a>"#, base), 1).await;

    let crawler = Crawler::new(create_test_config()).expect("Failed to create crawler");
    let result = crawler.crawl(&format!("{}/", base)).await.unwrap();

    assert!(result.broken.is_empty());
    assert_eq!(result.working, vec![format!("{}/", base)]);
}

#[tokio::test]
async fn test_broken_page_reported() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/", 200, 1).await;
    mount_get(
        &server,
        "/",
        &format!(
            r#"<a href="{0}/fine">Fine</a> <a href="{0}/oops">Oops</a>"#,
            base
        ),
        1,
    )
    .await;
    mount_head(&server, "/fine", 200, 1).await;
    mount_get(&server, "/fine", "No links here", 1).await;
    mount_head(&server, "/oops", 500, 1).await;
    mount_get(&server, "/oops", "", 0).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let result = crawler.crawl(&format!("{}/", base)).await.unwrap();

    assert!(!result.is_clean());
    assert_eq!(result.broken, vec![format!("{}/oops", base)]);
    assert_eq!(
        sorted(result.working),
        vec![format!("{}/", base), format!("{}/fine", base)]
    );
}

#[tokio::test]
async fn test_third_party_link_checked_but_not_followed() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;

    mount_head(&site, "/", 200, 1).await;
    mount_get(
        &site,
        "/",
        &format!(r#"<a href="{}/external">Partner</a>"#, elsewhere.uri()),
        1,
    )
    .await;
    mount_head(&elsewhere, "/external", 200, 1).await;
    mount_get(&elsewhere, "/external", "<a href=\"/deeper\">x</a>", 0).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let result = crawler.crawl(&format!("{}/", site.uri())).await.unwrap();

    assert!(result.broken.is_empty());
    assert!(result
        .working
        .contains(&format!("{}/external", elsewhere.uri())));
}

#[tokio::test]
async fn test_redirect_to_third_party_not_fetched() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let base = site.uri();

    mount_head(&site, "/", 200, 1).await;
    mount_get(&site, "/", &format!(r#"<a href="{}/go">Go</a>"#, base), 1).await;
    for verb in ["HEAD", "GET"] {
        Mock::given(method(verb))
            .and(path("/go"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/landing", elsewhere.uri()).as_str()),
            )
            .expect(if verb == "HEAD" { 1 } else { 0 })
            .mount(&site)
            .await;
    }

    mount_head(&elsewhere, "/landing", 200, 1).await;
    mount_get(
        &elsewhere,
        "/landing",
        &format!(r#"<a href="{}/theirs-only">Theirs</a>"#, base),
        0,
    )
    .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let result = crawler.crawl(&format!("{}/", base)).await.unwrap();

    assert!(result.broken.is_empty());
    assert!(result.working.contains(&format!("{}/go", base)));
}

#[tokio::test]
async fn test_non_html_resource_not_downloaded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/", 200, 1).await;
    mount_get(
        &server,
        "/",
        &format!(r#"<a href="{}/big.zip">Download</a>"#, base),
        1,
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/big.zip"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/zip"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/big.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 1024], "application/zip"))
        .expect(0)
        .mount(&server)
        .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let result = crawler.crawl(&format!("{}/", base)).await.unwrap();

    assert!(result.broken.is_empty());
    assert!(result.working.contains(&format!("{}/big.zip", base)));
}

#[tokio::test]
async fn test_invalid_config_is_an_error() {
    let mut config = create_test_config();
    config.crawler.queue_capacity = 0;

    assert!(matches!(Crawler::new(config), Err(TetherError::Config(_))));
}

#[tokio::test]
async fn test_link_cycle_terminates() {
    let server = MockServer::start().await;
    let base = server.uri();

    for (page, other) in [("/a", "/b"), ("/b", "/a")] {
        mount_head(&server, page, 200, 1).await;
        mount_get(
            &server,
            page,
            &format!(r#"<a href="{}{}">next</a>"#, base, other),
            1,
        )
        .await;
    }

    let crawler = Crawler::new(create_test_config()).unwrap();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        crawler.crawl(&format!("{}/a", base)),
    )
    .await
    .expect("cyclic crawl should terminate")
    .unwrap();

    assert_eq!(
        sorted(result.working),
        vec![format!("{}/a", base), format!("{}/b", base)]
    );
}

#[tokio::test]
async fn test_rate_limited_link_recovers() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/", 200, 1).await;
    mount_get(&server, "/", &format!(r#"<a href="{}/busy">Busy</a>"#, base), 1).await;

    // First HEAD is throttled, the retry goes through
    Mock::given(method("HEAD"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_head(&server, "/busy", 200, 1).await;
    mount_get(&server, "/busy", "", 1).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let result = crawler.crawl(&format!("{}/", base)).await.unwrap();

    assert!(result.broken.is_empty());
    assert!(result.rate_limited.is_empty());
    assert!(result.working.contains(&format!("{}/busy", base)));
}

#[tokio::test]
async fn test_persistently_rate_limited_link_not_broken() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/", 200, 1).await;
    mount_get(&server, "/", &format!(r#"<a href="{}/busy">Busy</a>"#, base), 1).await;
    // One attempt plus one retry
    mount_head(&server, "/busy", 429, 2).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let result = crawler.crawl(&format!("{}/", base)).await.unwrap();

    assert!(result.broken.is_empty());
    assert_eq!(result.rate_limited, vec![format!("{}/busy", base)]);
}

#[tokio::test]
async fn test_slow_link_is_broken() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/", 200, 1).await;
    mount_get(&server, "/", &format!(r#"<a href="{}/slow">Slow</a>"#, base), 1).await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.http.timeout_secs = 1;
    let crawler = Crawler::new(config).unwrap();
    let result = crawler.crawl(&format!("{}/", base)).await.unwrap();

    assert_eq!(result.broken, vec![format!("{}/slow", base)]);
}

#[tokio::test]
async fn test_polling_completion_over_http() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/", 200, 1).await;
    mount_get(
        &server,
        "/",
        &format!(
            r#"<a href="{0}/one">1</a><a href="{0}/two">2</a><a href="{0}/missing">3</a>"#,
            base
        ),
        1,
    )
    .await;
    for page in ["/one", "/two"] {
        mount_head(&server, page, 200, 1).await;
        mount_get(&server, page, &format!(r#"<a href="{}/">up</a>"#, base), 1).await;
    }

    let mut config = create_test_config();
    config.crawler.completion = CompletionStrategy::Polling;
    let crawler = Crawler::new(config).unwrap();
    let result = crawler.crawl(&format!("{}/", base)).await.unwrap();

    // Unmatched requests get wiremock's default 404
    assert_eq!(result.broken, vec![format!("{}/missing", base)]);
    assert_eq!(result.working.len(), 3);
}

#[tokio::test]
async fn test_invalid_root_url() {
    let crawler = Crawler::new(create_test_config()).unwrap();
    let result = crawler.crawl("/not/a/site").await;

    assert!(matches!(result, Err(TetherError::InvalidRoot { .. })));
}
