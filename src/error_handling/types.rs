//! Error type definitions.
//!
//! This module defines all error and warning types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::models::AnalyzeResult;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing an HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Reasons a user-supplied URL is rejected before any work is done.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("url is required")]
    Empty,

    #[error("url exceeds maximum length ({length} > {max})")]
    TooLong { length: usize, max: usize },

    #[error("url contains control characters")]
    ControlCharacters,

    #[error("unsupported url scheme '{0}' (only http and https are allowed)")]
    BadScheme(String),

    #[error("invalid url: {0}")]
    Parse(#[from] url::ParseError),

    #[error("url has no host")]
    BadHost,

    #[error("url must not contain credentials")]
    UserInfoPresent,

    #[error("invalid port '{0}' (expected 1-65535)")]
    BadPort(String),
}

/// Failures of the one-shot page fetch.
///
/// Non-2xx statuses are not fetch errors; they reach the caller as response
/// metadata.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("failed to resolve host '{host}': {message}")]
    ResolutionFailed { host: String, message: String },

    #[error("refusing to fetch private address")]
    SsrfBlocked,

    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// Connection, TLS, timeout, cancellation or redirect failures.
    #[error("{0}")]
    Transport(String),
}

/// Failures while reading or parsing a fetched page.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read response body: {0}")]
    Read(#[from] std::io::Error),

    #[error("{}", crate::config::CANCELLED_MESSAGE)]
    Cancelled,
}

/// Failure of one analysis stage.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("upstream returned {0}")]
    UpstreamStatus(u16),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalyzeError {
    /// True when the failure happened before any outbound work, i.e. the
    /// caller supplied bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalyzeError::InvalidUrl(_))
    }
}

/// An analysis that stopped early.
///
/// Carries the best-effort result (URL echoed, zero values elsewhere, the
/// failure recorded in `errors`) alongside the error that stopped it.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct AnalysisFailure {
    pub partial: Box<AnalyzeResult>,
    pub source: AnalyzeError,
}

impl AnalysisFailure {
    pub fn new(partial: AnalyzeResult, source: AnalyzeError) -> Self {
        Self {
            partial: Box::new(partial),
            source,
        }
    }
}

/// Non-fatal conditions reported in the `warnings` list of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    MissingTitle,         // Page has no title or an empty one
    BodyTruncated,        // Body hit the byte cap; analysis covers the prefix
    RedirectLimitReached, // Last response was a redirect we did not follow
    LinkCheckInterrupted, // Deadline/cancellation stopped some probes
}

impl WarningType {
    /// Renders the warning text. `count` is the byte cap for
    /// `BodyTruncated` and the number of unchecked links for
    /// `LinkCheckInterrupted`; it is ignored otherwise.
    pub fn message(&self, count: u64) -> String {
        match self {
            WarningType::MissingTitle => "page has no title".to_string(),
            WarningType::BodyTruncated => {
                format!("response body truncated at {count} bytes")
            }
            WarningType::RedirectLimitReached => {
                "redirect limit reached; analyzed the last redirect response".to_string()
            }
            WarningType::LinkCheckInterrupted => {
                format!("link validation interrupted: {count} links were not checked")
            }
        }
    }
}
