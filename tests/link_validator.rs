//! Integration tests for bounded link validation
//!
//! Local axum servers count in-flight HEAD requests to verify:
//! - The global concurrency cap
//! - The per-host concurrency cap, shared across ports of one host
//! - Result order, status mapping, timeouts and cancellation

mod helpers;

use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;
use page_analyzer::initialization::init_probe_client;
use page_analyzer::LinkValidator;
use tokio_util::sync::CancellationToken;
use url::Url;

use helpers::{spawn_server, InFlight};

async fn slow_ok(State(in_flight): State<InFlight>) -> StatusCode {
    in_flight.hold(Duration::from_millis(200)).await;
    StatusCode::OK
}

async fn observed_server(in_flight: InFlight) -> String {
    let app = Router::new()
        .route("/page/{id}", get(slow_ok))
        .with_state(in_flight);
    format!("http://{}", spawn_server(app).await)
}

fn links(base: &str, count: usize) -> Vec<Url> {
    (0..count)
        .map(|i| Url::parse(&format!("{base}/page/{i}")).unwrap())
        .collect()
}

fn validator(global: usize, per_host: usize, timeout: Duration) -> LinkValidator {
    LinkValidator::new(init_probe_client().unwrap(), global, per_host, timeout)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_global_limit_caps_in_flight_probes() {
    let in_flight = InFlight::default();
    let base = observed_server(in_flight.clone()).await;
    let links = links(&base, 5);

    let results = validator(2, 10, Duration::from_secs(5))
        .validate(&CancellationToken::new(), &links)
        .await;

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.accessible && r.status == 200));
    assert_eq!(in_flight.total(), 5);
    assert!(in_flight.peak() <= 2, "peak was {}", in_flight.peak());
    assert!(in_flight.peak() >= 2, "probes never overlapped");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_per_host_limit_spans_ports() {
    // Two listeners on 127.0.0.1 feed one counter: both ports are the same host
    let in_flight = InFlight::default();
    let first_base = observed_server(in_flight.clone()).await;
    let second_base = observed_server(in_flight.clone()).await;

    let mut all = links(&first_base, 4);
    all.extend(links(&second_base, 4));

    let results = validator(10, 1, Duration::from_secs(5))
        .validate(&CancellationToken::new(), &all)
        .await;

    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|r| r.accessible));
    assert_eq!(in_flight.total(), 8);
    assert_eq!(in_flight.peak(), 1, "per-host cap exceeded across ports");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_per_host_limit_caps_in_flight_probes() {
    let in_flight = InFlight::default();
    let base = observed_server(in_flight.clone()).await;
    let links = links(&base, 6);

    let results = validator(10, 2, Duration::from_secs(5))
        .validate(&CancellationToken::new(), &links)
        .await;

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.accessible));
    assert!(in_flight.peak() <= 2, "peak was {}", in_flight.peak());
}

#[tokio::test]
async fn test_results_follow_input_order() {
    let app = Router::new()
        .route("/ok", get(|| async { StatusCode::OK }))
        .route("/moved", get(|| async { Redirect::permanent("/ok") }))
        .route("/post-only", post(|| async { StatusCode::OK }))
        .route("/error", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let base = format!("http://{}", spawn_server(app).await);

    let links: Vec<Url> = ["/error", "/ok", "/nowhere", "/moved", "/post-only"]
        .iter()
        .map(|p| Url::parse(&format!("{base}{p}")).unwrap())
        .collect();

    let results = validator(10, 2, Duration::from_secs(5))
        .validate(&CancellationToken::new(), &links)
        .await;

    let urls: Vec<&Url> = results.iter().map(|r| &r.url).collect();
    assert_eq!(urls, links.iter().collect::<Vec<_>>());

    let statuses: Vec<u16> = results.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![500, 200, 404, 200, 405]);

    let accessible: Vec<bool> = results.iter().map(|r| r.accessible).collect();
    assert_eq!(accessible, vec![false, true, false, true, false]);
}

#[tokio::test]
async fn test_slow_link_times_out() {
    let app = Router::new().route(
        "/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::OK
        }),
    );
    let base = format!("http://{}", spawn_server(app).await);
    let links = vec![Url::parse(&format!("{base}/slow")).unwrap()];

    let results = validator(10, 2, Duration::from_millis(100))
        .validate(&CancellationToken::new(), &links)
        .await;

    assert!(!results[0].accessible);
    assert_eq!(results[0].status, 0);
    assert!(results[0].error.as_deref().unwrap_or_default().contains("timed out"));
}

#[tokio::test]
async fn test_unreachable_link_is_inaccessible() {
    let links = vec![Url::parse("http://127.0.0.1:1/").unwrap()];
    let results = validator(10, 2, Duration::from_secs(5))
        .validate(&CancellationToken::new(), &links)
        .await;
    assert!(!results[0].accessible);
    assert_eq!(results[0].status, 0);
    assert!(results[0].error.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancellation_finishes_waiting_and_running_probes() {
    let app = Router::new().route(
        "/page/{id}",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            StatusCode::OK
        }),
    );
    let base = format!("http://{}", spawn_server(app).await);
    let links = links(&base, 6);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let results = validator(10, 2, Duration::from_secs(30))
        .validate(&cancel, &links)
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.is_cancelled() && !r.accessible));
}
