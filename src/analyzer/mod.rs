//! Page analysis orchestration.
//!
//! `Analyzer::analyze` runs the pipeline for one request:
//! validate → fetch → inspect → classify links → validate links.
//! Stages run sequentially under one deadline scope; only link validation is
//! internally parallel. A failed stage yields an `AnalysisFailure` carrying the
//! partial result.

mod deadline;

use std::time::Duration;

use log::{info, warn};
use tokio_util::sync::CancellationToken;
use url::Url;

pub use deadline::DeadlineScope;

use crate::config::{
    Config, DEFAULT_FETCH_TIMEOUT_SECS, LINK_CHECK_GLOBAL_LIMIT, LINK_CHECK_PER_HOST_LIMIT,
};
use crate::error_handling::{AnalysisFailure, AnalyzeError, InitializationError, ParseError, WarningType};
use crate::fetch::{Fetcher, FetcherConfig};
use crate::initialization::init_probe_client;
use crate::linkcheck::LinkValidator;
use crate::models::{AnalyzeRequest, AnalyzeResult};
use crate::parse;
use crate::security::validate_and_normalize_url;

/// Timeouts and link-check limits.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Used when a request does not carry its own timeout
    pub default_timeout: Duration,
    pub link_global_limit: usize,
    pub link_per_host_limit: usize,
    /// Per-probe timeout
    pub link_timeout: Duration,
}

impl AnalyzerConfig {
    /// Defaults for `default_timeout`; probes get half of it.
    pub fn with_default_timeout(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            link_global_limit: LINK_CHECK_GLOBAL_LIMIT,
            link_per_host_limit: LINK_CHECK_PER_HOST_LIMIT,
            link_timeout: default_timeout / 2,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::with_default_timeout(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }
}

impl From<&Config> for AnalyzerConfig {
    fn from(config: &Config) -> Self {
        Self::with_default_timeout(config.fetch_timeout())
    }
}

/// The page analyzer. Cheap to clone; clients are shared.
#[derive(Debug, Clone)]
pub struct Analyzer {
    fetcher: Fetcher,
    probe_client: reqwest::Client,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(fetcher: Fetcher, probe_client: reqwest::Client, config: AnalyzerConfig) -> Self {
        Self {
            fetcher,
            probe_client,
            config,
        }
    }

    /// Builds an analyzer and both HTTP clients from application config.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if a client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        let fetcher = Fetcher::new(FetcherConfig::from(config))?;
        let probe_client = init_probe_client()?;
        Ok(Self::new(fetcher, probe_client, AnalyzerConfig::from(config)))
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes one page.
    ///
    /// The whole call is bounded by the request timeout (or the configured
    /// default) and by `cancel`. Link probes that do not finish in time count as
    /// inaccessible; everything else that is cut short fails the analysis.
    ///
    /// # Errors
    ///
    /// Returns an `AnalysisFailure` whose `source` is:
    /// - `InvalidUrl` if the URL is rejected (nothing was fetched)
    /// - `Fetch` if no response could be obtained
    /// - `UpstreamStatus` if the page answered outside `[200, 400)`
    /// - `Parse` if reading the body failed or was cancelled
    pub async fn analyze(
        &self,
        request: &AnalyzeRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalyzeResult, AnalysisFailure> {
        let url = validate_and_normalize_url(&request.url).map_err(|e| {
            AnalysisFailure::new(AnalyzeResult::empty(request.url.trim()), e.into())
        })?;

        let timeout = match request.timeout_seconds {
            Some(seconds) if seconds > 0 => Duration::from_secs(seconds),
            _ => self.config.default_timeout,
        };
        let scope = DeadlineScope::new(cancel, timeout);
        let token = scope.token();

        info!("Analyzing {url} (timeout {}s)", timeout.as_secs());
        let mut result = AnalyzeResult::empty(url.as_str());

        let mut page = match self.fetcher.get(token, &url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Fetch failed for {url}: {e}");
                return Err(fail(result, e.into()));
            }
        };

        let status = page.status.as_u16();
        if !(200..400).contains(&status) {
            warn!("Upstream {url} returned status {status}");
            result.errors.push(format!("upstream status: {status}"));
            return Err(AnalysisFailure::new(result, AnalyzeError::UpstreamStatus(status)));
        }

        let parsed = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ParseError::Cancelled),
            parsed = parse::inspect(&mut page.body, &url) => parsed,
        };
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to read page {url}: {e}");
                return Err(fail(result, e.into()));
            }
        };

        result.html_version = parsed.html_version;
        result.title = parsed.title;
        result.headings = parsed.headings;
        result.login_form_present = parsed.login_form_present;

        if result.title.is_empty() {
            result.warnings.push(WarningType::MissingTitle.message(0));
        }
        if page.body.limit_reached() {
            result
                .warnings
                .push(WarningType::BodyTruncated.message(page.body.limit()));
        }
        if page.redirects_exhausted {
            result.warnings.push(WarningType::RedirectLimitReached.message(0));
        }
        // Release the upstream connection before probing links
        drop(page);

        let (internal, external) = classify_links(&url, &parsed.links);
        result.links_internal = internal;
        result.links_external = external;

        if !parsed.links.is_empty() {
            let validator = LinkValidator::new(
                self.probe_client.clone(),
                self.config.link_global_limit,
                self.config.link_per_host_limit,
                self.config.link_timeout,
            );
            let probes = validator.validate(token, &parsed.links).await;
            result.links_inaccessible = probes.iter().filter(|p| !p.accessible).count();

            let interrupted = probes.iter().filter(|p| p.is_cancelled()).count();
            if interrupted > 0 {
                result
                    .warnings
                    .push(WarningType::LinkCheckInterrupted.message(interrupted as u64));
            }
        }

        info!(
            "Analyzed {url}: version={} internal={} external={} inaccessible={} login={}",
            result.html_version,
            result.links_internal,
            result.links_external,
            result.links_inaccessible,
            result.login_form_present
        );
        Ok(result)
    }
}

/// Records `error` in the partial result and wraps both.
fn fail(mut result: AnalyzeResult, error: AnalyzeError) -> AnalysisFailure {
    result.errors.push(error.to_string());
    AnalysisFailure::new(result, error)
}

/// Counts links on the page's host and elsewhere.
///
/// Host names compare ASCII case-insensitively; an explicit port must match
/// too, so `example.com:8080` is external to `example.com`.
pub fn classify_links(page: &Url, links: &[Url]) -> (usize, usize) {
    let page_host = page.host_str().unwrap_or_default();
    links.iter().fold((0, 0), |(internal, external), link| {
        let same_host = link
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(page_host));
        if same_host && link.port() == page.port() {
            (internal + 1, external)
        } else {
            (internal, external + 1)
        }
    })
}
