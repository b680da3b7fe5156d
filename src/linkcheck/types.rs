//! Link probe outcomes.

use url::Url;

use crate::config::CANCELLED_MESSAGE;

/// Outcome of probing one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkProbeResult {
    pub url: Url,
    /// `200 <= status < 400`
    pub accessible: bool,
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    /// Transport, timeout or cancellation message
    pub error: Option<String>,
}

impl LinkProbeResult {
    pub(crate) fn from_status(url: Url, status: u16) -> Self {
        Self {
            url,
            accessible: (200..400).contains(&status),
            status,
            error: None,
        }
    }

    pub(crate) fn failed(url: Url, message: impl Into<String>) -> Self {
        Self {
            url,
            accessible: false,
            status: 0,
            error: Some(message.into()),
        }
    }

    pub(crate) fn cancelled(url: Url) -> Self {
        Self::failed(url, CANCELLED_MESSAGE)
    }

    /// True if the probe never completed because the scope was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.error.as_deref() == Some(CANCELLED_MESSAGE)
    }
}
