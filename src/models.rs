//! Public request/response contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

/// The six standard heading levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Tag name (and report key) of the level, e.g. `"h1"`.
    pub fn tag(self) -> &'static str {
        self.into()
    }
}

/// Heading counts keyed `h1`..`h6`, serialized in level order.
pub type HeadingCounts = BTreeMap<String, usize>;

/// Returns a heading map with all six levels present and zero.
pub fn empty_heading_counts() -> HeadingCounts {
    HeadingLevel::iter()
        .map(|level| (level.tag().to_string(), 0))
        .collect()
}

/// A request to analyze one page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Target URL as typed by the user
    #[serde(default)]
    pub url: String,
    /// Per-call timeout in whole seconds; absent or zero uses the configured default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl AnalyzeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: None,
        }
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

/// The public page report.
///
/// Every field is always present, also when the analysis failed part way:
/// missing data is left at its zero value and `errors` explains what was lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub url: String,
    pub html_version: String,
    pub title: String,
    pub headings: HeadingCounts,
    pub links_internal: usize,
    pub links_external: usize,
    pub links_inaccessible: usize,
    pub login_form_present: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl AnalyzeResult {
    /// A zero-valued result for `url`.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html_version: String::new(),
            title: String::new(),
            headings: empty_heading_counts(),
            links_internal: 0,
            links_external: 0,
            links_inaccessible: 0,
            login_form_present: false,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}
