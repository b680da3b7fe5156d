//! HTTP client initialization.
//!
//! Two long-lived clients are built at startup and shared by all requests:
//! the page client used by the fetcher and the probe client used by link
//! validation.

use std::sync::Arc;

use reqwest::redirect::{Attempt, Policy};
use reqwest::ClientBuilder;
use url::{Host, Url};

use crate::config::{DEFAULT_USER_AGENT, LINK_CHECK_MAX_REDIRECTS, TCP_CONNECT_TIMEOUT};
use crate::error_handling::{FetchError, InitializationError};
use crate::fetch::FetcherConfig;
use crate::security::{is_restricted_ip, GuardedResolver};

/// Builds the page-fetch client.
///
/// Creates a `reqwest::Client` configured with:
/// - the analyzer User-Agent
/// - the total request timeout from `config`
/// - a redirect policy that follows at most `max_redirects` hops and then
///   hands back the last redirect response instead of failing
/// - in hardened mode, the `GuardedResolver` and a redirect check that refuses
///   private IP literals and localhost names
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_fetch_client(config: &FetcherConfig) -> Result<reqwest::Client, InitializationError> {
    let max_redirects = config.max_redirects;
    let hardened = !config.allow_private_addresses;

    let policy = Policy::custom(move |attempt: Attempt| {
        if hardened && is_restricted_target(attempt.url()) {
            log::warn!("Blocked redirect to private address: {}", attempt.url());
            return attempt.error(FetchError::SsrfBlocked);
        }
        if attempt.previous().len() > max_redirects {
            log::debug!(
                "Redirect limit ({}) reached, returning last response",
                max_redirects
            );
            attempt.stop()
        } else {
            attempt.follow()
        }
    });

    let mut builder = ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(TCP_CONNECT_TIMEOUT)
        .user_agent(DEFAULT_USER_AGENT)
        .redirect(policy);

    if hardened {
        builder = builder.dns_resolver(Arc::new(GuardedResolver));
    }

    Ok(builder.build()?)
}

/// Builds the link-probe client.
///
/// No total timeout is set on the client; each probe is bounded by the
/// validator's own per-probe timeout.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_probe_client() -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .connect_timeout(TCP_CONNECT_TIMEOUT)
        .user_agent(DEFAULT_USER_AGENT)
        .redirect(Policy::limited(LINK_CHECK_MAX_REDIRECTS))
        .build()?;
    Ok(client)
}

/// Returns `true` if `url` names a restricted IP literal or a localhost name.
///
/// Domain names are left to the `GuardedResolver`.
fn is_restricted_target(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => is_restricted_ip(ip.into()),
        Some(Host::Ipv6(ip)) => is_restricted_ip(ip.into()),
        Some(Host::Domain(domain)) => is_localhost_domain(domain),
        None => true,
    }
}

/// Checks if a domain name is a localhost variant.
fn is_localhost_domain(domain: &str) -> bool {
    let domain_lower = domain.trim_end_matches('.').to_lowercase();
    domain_lower == "localhost"
        || domain_lower == "localhost.localdomain"
        || domain_lower.ends_with(".localhost")
}
