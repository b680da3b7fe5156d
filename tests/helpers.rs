// Shared test helpers: analyzers wired for local servers and small axum
// servers that observe request concurrency.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use page_analyzer::initialization::init_probe_client;
use page_analyzer::{Analyzer, AnalyzerConfig, Fetcher, FetcherConfig};

/// Fetcher settings for tests against servers on 127.0.0.1.
#[allow(dead_code)]
pub fn local_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        timeout: Duration::from_secs(5),
        max_redirects: 5,
        max_bytes: 4 * 1024 * 1024,
        allow_private_addresses: true,
    }
}

/// An analyzer that may fetch local pages.
#[allow(dead_code)]
pub fn local_analyzer(fetcher_config: FetcherConfig) -> Analyzer {
    let fetcher = Fetcher::new(fetcher_config).expect("Failed to build fetcher");
    let probe_client = init_probe_client().expect("Failed to build probe client");
    Analyzer::new(
        fetcher,
        probe_client,
        AnalyzerConfig::with_default_timeout(Duration::from_secs(10)),
    )
}

/// Serves `app` on an ephemeral local port.
#[allow(dead_code)]
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Tracks current and peak in-flight requests.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct InFlight {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl InFlight {
    /// Marks a request in flight for `hold`, then done.
    pub async fn hold(&self, hold: Duration) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(hold).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}
