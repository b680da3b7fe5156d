//! HTML inspection.
//!
//! Extracts the facts reported for a page from its (already size-capped) body:
//! - HTML version from the doctype
//! - Title
//! - Heading counts per level
//! - Absolute outbound links
//! - Whether a login form is present
//!
//! All parsing is done with the `scraper` crate. Malformed markup never fails;
//! the HTML5 parser recovers and whatever can be extracted is reported.

mod doctype;
mod login;

use std::sync::LazyLock;

use log::debug;
use scraper::{Html, Selector};
use strum::IntoEnumIterator;
use tokio::io::{AsyncRead, AsyncReadExt};
use url::Url;

pub use doctype::{classify_doctype, detect_html_version, UNKNOWN_DOCTYPE};
pub use login::{detect_login, has_auth_cta, has_login_form};

use crate::error_handling::ParseError;
use crate::models::{empty_heading_counts, HeadingCounts, HeadingLevel};
use crate::utils::parse_selector_with_fallback;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("title", "title extraction"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("a[href]", "link extraction"));
static HEADING_SELECTORS: LazyLock<Vec<(HeadingLevel, Selector)>> = LazyLock::new(|| {
    HeadingLevel::iter()
        .map(|level| {
            (
                level,
                parse_selector_with_fallback(level.tag(), "heading extraction"),
            )
        })
        .collect()
});

/// Everything the inspector extracts from one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPage {
    pub html_version: String,
    pub title: String,
    pub headings: HeadingCounts,
    /// Absolute links in document order, duplicates kept
    pub links: Vec<Url>,
    pub login_form_present: bool,
}

/// Reads `reader` to EOF and inspects the markup.
///
/// The body is decoded as UTF-8 with invalid sequences replaced.
///
/// # Errors
///
/// Returns `ParseError::Read` if reading the body fails.
pub async fn inspect<R>(mut reader: R, base: &Url) -> Result<ParsedPage, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    let html = String::from_utf8_lossy(&bytes);
    Ok(inspect_html(&html, base))
}

/// Inspects an HTML document. Relative links are resolved against `base`.
pub fn inspect_html(html: &str, base: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let page = ParsedPage {
        html_version: detect_html_version(&document),
        title: extract_title(&document),
        headings: count_headings(&document),
        links: extract_links(&document, base),
        login_form_present: detect_login(&document),
    };

    debug!(
        "Inspected {base}: version={} title={:?} links={} login_form_present={}",
        page.html_version,
        page.title,
        page.links.len(),
        page.login_form_present
    );
    page
}

/// Trimmed text of the first `<title>`, or `""`.
pub fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Number of elements per heading level; every level is present.
pub fn count_headings(document: &Html) -> HeadingCounts {
    let mut counts = empty_heading_counts();
    for (level, selector) in HEADING_SELECTORS.iter() {
        counts.insert(level.tag().to_string(), document.select(selector).count());
    }
    counts
}

/// Resolves every non-empty `href` against `base`.
///
/// Links without both a scheme and a host (`mailto:`, `javascript:`, unresolvable
/// references) are dropped.
pub fn extract_links(document: &Html, base: &Url) -> Vec<Url> {
    document
        .select(&LINK_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !href.is_empty())
        .filter_map(|href| base.join(href).ok())
        .filter(|link| !link.scheme().is_empty() && link.host_str().is_some_and(|h| !h.is_empty()))
        .collect()
}
