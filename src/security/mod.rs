//! Input validation and SSRF protection.
//!
//! This module guards the outbound side of the service:
//! - User-supplied URLs are validated and normalized before any work is done
//! - Resolved addresses are classified so that loopback, private, link-local
//!   and multicast targets are never fetched
//! - A `reqwest` DNS resolver applies the same policy at connect time

mod ip;
mod safe_resolver;
mod url_validation;

pub use ip::is_restricted_ip;
pub use safe_resolver::{find_restricted, resolve_host, GuardedResolver};
pub use url_validation::validate_and_normalize_url;
