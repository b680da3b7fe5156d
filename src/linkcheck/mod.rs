//! Bounded concurrent link validation.
//!
//! Every link is probed with a single HEAD request. Two limits apply at once:
//! a global cap on in-flight probes and a cap per host name. The
//! permit sets live only for one `validate` call, so concurrent analyses do
//! not share limits.

mod types;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use log::debug;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use types::LinkProbeResult;

type HostLimits = Arc<Mutex<HashMap<String, Arc<Semaphore>>>>;

/// Probes links under a global and a per-host concurrency limit.
#[derive(Debug, Clone)]
pub struct LinkValidator {
    client: reqwest::Client,
    global_limit: usize,
    per_host_limit: usize,
    timeout: Duration,
}

impl LinkValidator {
    /// Creates a validator. Limits below one are raised to one.
    pub fn new(
        client: reqwest::Client,
        global_limit: usize,
        per_host_limit: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            global_limit: global_limit.max(1),
            per_host_limit: per_host_limit.max(1),
            timeout,
        }
    }

    /// Probes every link and returns one result per input, in input order.
    ///
    /// Returns only after every probe has finished. Probes still waiting for a
    /// permit or a response when `cancel` fires report `context cancelled`.
    pub async fn validate(&self, cancel: &CancellationToken, links: &[Url]) -> Vec<LinkProbeResult> {
        if links.is_empty() {
            return Vec::new();
        }

        let global = Arc::new(Semaphore::new(self.global_limit));
        let hosts: HostLimits = Arc::new(Mutex::new(HashMap::new()));

        let handles: Vec<_> = links
            .iter()
            .cloned()
            .map(|link| {
                let probe = Probe {
                    client: self.client.clone(),
                    global: Arc::clone(&global),
                    hosts: Arc::clone(&hosts),
                    per_host_limit: self.per_host_limit,
                    timeout: self.timeout,
                    cancel: cancel.clone(),
                };
                tokio::spawn(probe.run(link))
            })
            .collect();

        let results: Vec<LinkProbeResult> = join_all(handles)
            .await
            .into_iter()
            .zip(links)
            .map(|(joined, link)| {
                joined.unwrap_or_else(|e| {
                    log::error!("Link probe task for {link} failed: {e}");
                    LinkProbeResult::failed(link.clone(), format!("link probe task failed: {e}"))
                })
            })
            .collect();

        debug!(
            "Validated {} links: {} inaccessible",
            results.len(),
            results.iter().filter(|r| !r.accessible).count()
        );
        results
    }
}

/// State moved into one probe task.
struct Probe {
    client: reqwest::Client,
    global: Arc<Semaphore>,
    hosts: HostLimits,
    per_host_limit: usize,
    timeout: Duration,
    cancel: CancellationToken,
}

impl Probe {
    async fn run(self, link: Url) -> LinkProbeResult {
        let _global_permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return LinkProbeResult::cancelled(link),
            permit = self.global.acquire() => match permit {
                Ok(permit) => permit,
                Err(e) => return LinkProbeResult::failed(link, e.to_string()),
            },
        };

        let host_limit = self.host_semaphore(&link);
        let _host_permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return LinkProbeResult::cancelled(link),
            permit = host_limit.acquire() => match permit {
                Ok(permit) => permit,
                Err(e) => return LinkProbeResult::failed(link, e.to_string()),
            },
        };

        let request = self.client.head(link.clone()).send();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => LinkProbeResult::cancelled(link),
            outcome = tokio::time::timeout(self.timeout, request) => match outcome {
                Ok(Ok(response)) => LinkProbeResult::from_status(link, response.status().as_u16()),
                Ok(Err(e)) => {
                    debug!("Link probe failed for {link}: {e}");
                    LinkProbeResult::failed(link, e.to_string())
                }
                Err(_) => LinkProbeResult::failed(
                    link,
                    format!("timed out after {}ms", self.timeout.as_millis()),
                ),
            },
        }
    }

    /// Per-host semaphore, inserted on first use.
    fn host_semaphore(&self, link: &Url) -> Arc<Semaphore> {
        let key = host_key(link);
        let mut hosts = self
            .hosts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            hosts
                .entry(key)
                .or_insert_with(|| Arc::new(Semaphore::new(self.per_host_limit))),
        )
    }
}

/// Lowercased host name; scheme and port do not split the limit.
fn host_key(link: &Url) -> String {
    link.host_str().unwrap_or_default().to_ascii_lowercase()
}
