//! Configuration constants.
//!
//! This module defines the operational parameters that are not exposed as
//! configuration: fixed timeouts, link-check limits and input size limits.

use std::time::Duration;

/// User-Agent sent with every outbound request.
pub const DEFAULT_USER_AGENT: &str = "PageAnalyzer/1.0";

// Defaults for the environment-driven settings
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FETCH_MAX_REDIRECTS: usize = 5;
/// Maximum page body size in bytes (4MiB). Bytes past this are never read.
pub const DEFAULT_FETCH_MAX_BYTES: u64 = 4 * 1024 * 1024;

/// Time allowed between sending the request and receiving response headers.
pub const RESPONSE_HEADER_TIMEOUT: Duration = Duration::from_secs(30);
/// TCP connection timeout for outbound requests.
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// Link validation
/// Maximum link probes in flight for a single analysis.
pub const LINK_CHECK_GLOBAL_LIMIT: usize = 10;
/// Maximum link probes in flight against one host for a single analysis.
pub const LINK_CHECK_PER_HOST_LIMIT: usize = 2;
/// Upper bound on redirects a link probe follows.
pub const LINK_CHECK_MAX_REDIRECTS: usize = 5;

// Input limits
/// Maximum accepted URL length in characters.
pub const MAX_URL_LENGTH: usize = 2048;
/// Maximum size of an `/api/analyze` request body (64KB).
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Error string recorded for probes and stages stopped by cancellation.
pub const CANCELLED_MESSAGE: &str = "context cancelled";
