//! SSRF-safe DNS resolution.
//!
//! `resolve_host` is the lookup used by the fetcher's pre-flight guard.
//! `GuardedResolver` implements `reqwest::dns::Resolve` with the same policy so
//! that every connection the hardened client opens, including those made while
//! following redirects, is checked *before* a TCP socket is opened. This
//! closes the DNS-rebinding gap between the pre-flight check and the connect.

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, LazyLock};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tokio::sync::Semaphore;

use super::ip::is_restricted_ip;
use crate::error_handling::FetchError;

/// Concurrency limiter for DNS lookups (prevent resource exhaustion)
static DNS_SEMAPHORE: LazyLock<Arc<Semaphore>> = LazyLock::new(|| Arc::new(Semaphore::new(64)));

/// Resolves `host` to all of its addresses.
///
/// IP literals (bracketed or not) are returned without a lookup.
pub async fn resolve_host(host: &str) -> std::io::Result<Vec<IpAddr>> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }

    let _permit = DNS_SEMAPHORE
        .acquire()
        .await
        .map_err(std::io::Error::other)?;

    let addrs: Vec<IpAddr> = tokio::net::lookup_host((bare, 0))
        .await?
        .map(|addr| addr.ip())
        .collect();

    if addrs.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no addresses returned",
        ));
    }
    Ok(addrs)
}

/// Returns the first restricted address in `addrs`, if any.
pub fn find_restricted(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs.iter().copied().find(|ip| is_restricted_ip(*ip))
}

/// A DNS resolver that refuses hosts with any private/loopback/link-local/multicast address.
#[derive(Debug, Clone, Default)]
pub struct GuardedResolver;

impl Resolve for GuardedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let addrs = resolve_host(name.as_str())
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;

            if let Some(ip) = find_restricted(&addrs) {
                log::warn!(
                    "Blocked connection to private address {} for host '{}'",
                    ip,
                    name.as_str()
                );
                return Err(Box::new(FetchError::SsrfBlocked)
                    as Box<dyn std::error::Error + Send + Sync>);
            }

            let addrs: Addrs = Box::new(
                addrs
                    .into_iter()
                    .map(|ip| SocketAddr::new(ip, 0))
                    .collect::<Vec<_>>()
                    .into_iter(),
            );
            Ok(addrs)
        })
    }
}
