//! Integration tests for the analysis pipeline
//!
//! These tests run complete analyses against mock upstream servers and verify:
//! - The reported facts for a realistic page
//! - Partial results for failed analyses
//! - Private-address blocking with the default configuration
//! - Warnings for truncated bodies, missing titles and exhausted redirects
//! - Deadline expiry during link validation

mod helpers;

use std::time::{Duration, Instant};

use page_analyzer::{AnalyzeError, AnalyzeRequest, Analyzer, Config, FetchError, FetcherConfig};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use helpers::{local_analyzer, local_fetcher_config};

const BASIC_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Example Domain</title></head>
  <body>
    <h1>Welcome</h1>
    <h2>First</h2>
    <h2>Second</h2>
    <a href="/about">About</a>
    <a href="/missing">Missing</a>
    <a href="/about">About again</a>
    <a href="http://localhost:1/offline">Elsewhere</a>
    <a href="mailto:hello@example.com">Mail</a>
    <form action="/session" method="post">
      <input type="text" name="username">
      <input type="password" name="password">
      <button type="submit">Sign in</button>
    </form>
  </body>
</html>"#;

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/html; charset=utf-8")
        .set_body_string(body.into())
}

#[tokio::test]
async fn test_basic_page_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(BASIC_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let analyzer = local_analyzer(local_fetcher_config());
    let request = AnalyzeRequest::new(format!("{}/", server.uri()));
    let result = analyzer
        .analyze(&request, &CancellationToken::new())
        .await
        .expect("analysis should succeed");

    assert_eq!(result.url, format!("{}/", server.uri()));
    assert_eq!(result.html_version, "HTML5");
    assert_eq!(result.title, "Example Domain");
    assert_eq!(result.headings["h1"], 1);
    assert_eq!(result.headings["h2"], 2);
    assert_eq!(result.headings["h3"], 0);
    assert_eq!(result.headings.len(), 6);

    // mailto is dropped; the duplicate /about is kept
    assert_eq!(result.links_internal, 3);
    assert_eq!(result.links_external, 1);
    // /missing answers 404 and localhost:1 refuses connections
    assert_eq!(result.links_inaccessible, 2);
    assert!(result.login_form_present);
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_upstream_error_status_fails_with_partial_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let analyzer = local_analyzer(local_fetcher_config());
    let request = AnalyzeRequest::new(format!("{}/broken", server.uri()));
    let failure = analyzer
        .analyze(&request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(failure.source, AnalyzeError::UpstreamStatus(500)));
    assert_eq!(failure.partial.errors, vec!["upstream status: 500"]);
    assert_eq!(failure.partial.url, format!("{}/broken", server.uri()));
    assert_eq!(failure.partial.title, "");
    assert_eq!(failure.partial.headings.len(), 6);
}

#[tokio::test]
async fn test_default_config_blocks_loopback_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<title>internal</title>"))
        .mount(&server)
        .await;

    let analyzer = Analyzer::from_config(&Config::default()).unwrap();
    let request = AnalyzeRequest::new(server.uri());
    let failure = analyzer
        .analyze(&request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        failure.source,
        AnalyzeError::Fetch(FetchError::SsrfBlocked)
    ));
    assert_eq!(failure.partial.errors, vec!["refusing to fetch private address"]);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_truncated_body_is_analyzed_with_warning() {
    let server = MockServer::start().await;
    let mut page = String::from("<!DOCTYPE html><html><head><title>Big</title></head><body><h1>Top</h1>");
    page.push_str(&"<p>filler</p>".repeat(200));
    page.push_str("<h2>Never seen</h2></body></html>");
    Mock::given(method("GET"))
        .respond_with(html(page))
        .mount(&server)
        .await;

    let analyzer = local_analyzer(FetcherConfig {
        max_bytes: 1024,
        ..local_fetcher_config()
    });
    let result = analyzer
        .analyze(&AnalyzeRequest::new(server.uri()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.title, "Big");
    assert_eq!(result.headings["h1"], 1);
    assert_eq!(result.headings["h2"], 0);
    assert_eq!(result.warnings, vec!["response body truncated at 1024 bytes"]);
}

#[tokio::test]
async fn test_redirect_limit_and_missing_title_warnings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let analyzer = local_analyzer(FetcherConfig {
        max_redirects: 1,
        ..local_fetcher_config()
    });
    let result = analyzer
        .analyze(
            &AnalyzeRequest::new(format!("{}/loop", server.uri())),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        result.warnings,
        vec![
            "page has no title",
            "redirect limit reached; analyzed the last redirect response",
        ]
    );
    assert_eq!(result.links_internal + result.links_external, 0);
}

#[tokio::test]
async fn test_plain_3xx_is_not_reported_as_redirect_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/choices"))
        .respond_with(ResponseTemplate::new(300).set_body_string("<title>Choices</title>"))
        .mount(&server)
        .await;

    let result = local_analyzer(local_fetcher_config())
        .analyze(
            &AnalyzeRequest::new(format!("{}/choices", server.uri())),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.title, "Choices");
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_deadline_during_link_validation_returns_result() {
    let server = MockServer::start().await;
    let page = r#"<!DOCTYPE html><title>Slow links</title>
        <a href="/slow/1">1</a><a href="/slow/2">2</a>
        <a href="/slow/3">3</a><a href="/slow/4">4</a>"#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(page))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let analyzer = local_analyzer(local_fetcher_config());
    let request = AnalyzeRequest::new(format!("{}/", server.uri())).with_timeout_seconds(1);

    let started = Instant::now();
    let result = analyzer
        .analyze(&request, &CancellationToken::new())
        .await
        .expect("a deadline during link validation is not a failure");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.title, "Slow links");
    assert_eq!(result.links_internal, 4);
    assert_eq!(result.links_inaccessible, 4);
    assert_eq!(
        result.warnings,
        vec!["link validation interrupted: 4 links were not checked"]
    );
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_caller_cancellation_stops_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<title>late</title>").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let analyzer = local_analyzer(local_fetcher_config());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let failure = analyzer
        .analyze(&AnalyzeRequest::new(server.uri()), &cancel)
        .await
        .unwrap_err();
    assert_eq!(failure.partial.errors, vec!["context cancelled"]);
}
