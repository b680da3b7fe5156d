//! Safe one-shot page fetching.
//!
//! The fetcher performs a single GET against a validated URL. Before the
//! request is issued the host is resolved and, in hardened mode, the fetch is
//! refused if any address is loopback, private, link-local or multicast. Every
//! dimension of the fetch is bounded: total time, time to response headers,
//! redirect count and body size.

mod body;

use std::error::Error as StdError;
use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use body::BoundedBody;

use crate::config::{
    Config, CANCELLED_MESSAGE, DEFAULT_FETCH_MAX_BYTES, DEFAULT_FETCH_MAX_REDIRECTS,
    DEFAULT_FETCH_TIMEOUT_SECS, RESPONSE_HEADER_TIMEOUT,
};
use crate::error_handling::{FetchError, InitializationError};
use crate::initialization::init_fetch_client;
use crate::security::{find_restricted, resolve_host};

/// Bounds and policy for page fetches.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Total request timeout (connect, headers and body)
    pub timeout: Duration,
    /// Redirects followed before the last redirect response is returned
    pub max_redirects: usize,
    /// Body bytes handed to the caller
    pub max_bytes: u64,
    /// Skip the private-address guard. Only for tests against local servers.
    pub allow_private_addresses: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_redirects: DEFAULT_FETCH_MAX_REDIRECTS,
            max_bytes: DEFAULT_FETCH_MAX_BYTES,
            allow_private_addresses: false,
        }
    }
}

impl From<&Config> for FetcherConfig {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            max_redirects: config.fetch_max_redirects,
            max_bytes: config.fetch_max_bytes,
            allow_private_addresses: false,
        }
    }
}

/// Response metadata plus the capped body.
#[derive(Debug)]
pub struct FetchedPage {
    pub status: StatusCode,
    /// URL of the response actually returned (after redirects)
    pub final_url: Url,
    /// The redirect limit stopped the chain; `status` is a 3xx
    pub redirects_exhausted: bool,
    pub body: BoundedBody,
}

/// Page fetcher. Built once and shared by all requests.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Builds a fetcher and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the client cannot be built.
    pub fn new(config: FetcherConfig) -> Result<Self, InitializationError> {
        let client = init_fetch_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetches `url` under `cancel`.
    ///
    /// Non-2xx statuses are returned as ordinary pages; only failures to obtain
    /// a response at all are errors.
    ///
    /// # Errors
    ///
    /// - `UnsupportedScheme` for anything but http/https
    /// - `ResolutionFailed` if the host does not resolve
    /// - `SsrfBlocked` if any resolved address (or a redirect target) is private
    /// - `RequestBuild` if the request cannot be constructed
    /// - `Transport` for connection errors, timeouts and cancellation
    pub async fn get(&self, cancel: &CancellationToken, url: &Url) -> Result<FetchedPage, FetchError> {
        self.guard(cancel, url).await?;

        let request = self
            .client
            .get(url.clone())
            .build()
            .map_err(|e| FetchError::RequestBuild(error_chain(&e)))?;

        debug!("Fetching URL: {url}");
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(FetchError::Transport(CANCELLED_MESSAGE.to_string()));
            }
            result = tokio::time::timeout(RESPONSE_HEADER_TIMEOUT, self.client.execute(request)) => {
                match result {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        log::error!("Fetch failed for {url}: {}", error_chain(&e));
                        return Err(transport_error(e));
                    }
                    Err(_) => {
                        return Err(FetchError::Transport(format!(
                            "timed out waiting for response headers after {}s",
                            RESPONSE_HEADER_TIMEOUT.as_secs()
                        )));
                    }
                }
            }
        };

        let status = response.status();
        let final_url = response.url().clone();
        debug!("Fetch completed for {url}: status {status}, final url {final_url}");

        Ok(FetchedPage {
            status,
            final_url,
            redirects_exhausted: stopped_at_redirect_limit(&response),
            body: BoundedBody::from_response(response, self.config.max_bytes),
        })
    }

    /// Scheme check plus resolution of the host and the private-address policy.
    async fn guard(&self, cancel: &CancellationToken, url: &Url) -> Result<(), FetchError> {
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(FetchError::UnsupportedScheme(scheme.to_string())),
        }

        let host = url.host_str().unwrap_or_default();
        if host.is_empty() {
            return Err(FetchError::ResolutionFailed {
                host: String::new(),
                message: "url has no host".to_string(),
            });
        }

        let addrs = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(FetchError::Transport(CANCELLED_MESSAGE.to_string()));
            }
            result = resolve_host(host) => result.map_err(|e| FetchError::ResolutionFailed {
                host: host.to_string(),
                message: e.to_string(),
            })?,
        };

        if !self.config.allow_private_addresses {
            if let Some(ip) = find_restricted(&addrs) {
                warn!("Blocked fetch to private/loopback address: host={host} ip={ip}");
                return Err(FetchError::SsrfBlocked);
            }
        }
        Ok(())
    }
}

/// True when the redirect policy stopped on this response.
///
/// The client follows 301/302/303/307/308 with a resolvable `Location`; such a
/// response only reaches the caller when the hop limit was hit. Other 3xx
/// statuses (300, 304, or a redirect without `Location`) are plain responses.
fn stopped_at_redirect_limit(response: &reqwest::Response) -> bool {
    let followable = matches!(
        response.status(),
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    followable
        && response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|location| response.url().join(location).is_ok())
}

/// Maps a `reqwest::Error` to a `FetchError`.
///
/// A `FetchError` raised inside the client (guarded resolver or redirect
/// policy) is surfaced as itself rather than as a transport failure.
fn transport_error(error: reqwest::Error) -> FetchError {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(FetchError::SsrfBlocked) = err.downcast_ref::<FetchError>() {
            return FetchError::SsrfBlocked;
        }
        source = err.source();
    }
    FetchError::Transport(error_chain(&error))
}

/// Renders an error and its sources as `outer: inner: root`.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        let text = err.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = err.source();
    }
    message
}
