//! Validation and normalization of user-supplied URLs.
//!
//! Input is rejected unless it is a well-formed absolute http(s) URL with a
//! host, no credentials and a sane port. Scheme-less input that looks like a
//! host (`example.com`, `127.0.0.1:8080`, `[::1]`, `localhost`) is treated as
//! `https://`. The accepted URL is returned in canonical form.
//!
//! Address-level SSRF checks happen later, at fetch time, once the host has
//! been resolved.

use log::debug;
use url::Url;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::UrlValidationError;

/// Validates `raw` and returns the canonical URL.
///
/// # Errors
///
/// Returns the `UrlValidationError` variant naming the first rule the input
/// breaks.
///
/// # Examples
///
/// ```
/// use page_analyzer::validate_and_normalize_url;
///
/// let url = validate_and_normalize_url("  example.com/path ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/path");
///
/// assert!(validate_and_normalize_url("ftp://example.com").is_err());
/// assert!(validate_and_normalize_url("https://user:pw@example.com").is_err());
/// ```
pub fn validate_and_normalize_url(raw: &str) -> Result<Url, UrlValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let length = trimmed.chars().count();
    if length > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong {
            length,
            max: MAX_URL_LENGTH,
        });
    }

    if trimmed.chars().any(|c| c <= '\u{1f}' || c == '\u{7f}') {
        return Err(UrlValidationError::ControlCharacters);
    }

    let candidate = if !trimmed.contains("://") && looks_like_host(trimmed) {
        debug!("Adding https:// prefix to scheme-less input: {trimmed}");
        format!("https://{trimmed}")
    } else {
        trimmed.to_string()
    };

    if let Some(port) = explicit_port(&candidate) {
        if !is_valid_port(port) {
            return Err(UrlValidationError::BadPort(port.to_string()));
        }
    }

    let url = match Url::parse(&candidate) {
        Ok(url) => url,
        Err(url::ParseError::EmptyHost) => return Err(UrlValidationError::BadHost),
        Err(e) => return Err(UrlValidationError::Parse(e)),
    };

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::BadScheme(scheme.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::BadHost);
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(UrlValidationError::UserInfoPresent);
    }

    Ok(url)
}

/// Returns `true` if scheme-less input starts with something host-shaped:
/// an IPv4 literal or dotted name, a bracketed IPv6 literal, or `localhost`.
fn looks_like_host(input: &str) -> bool {
    let authority = authority_of(input);
    if authority.starts_with('[') {
        return authority.contains(']');
    }
    let host = authority.split(':').next().unwrap_or("");
    host.contains('.') || host.eq_ignore_ascii_case("localhost")
}

/// The portion of `input` before the first path, query or fragment delimiter.
fn authority_of(input: &str) -> &str {
    let end = input.find(['/', '?', '#']).unwrap_or(input.len());
    &input[..end]
}

/// Extracts the port text of an absolute URL, if one is written.
///
/// An empty port (`example.com:`) counts as absent.
fn explicit_port(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = authority_of(rest);
    // Drop userinfo
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

    let port = if host_port.starts_with('[') {
        let (_, after) = host_port.split_once(']')?;
        after.strip_prefix(':')?
    } else {
        host_port.rsplit_once(':')?.1
    };

    (!port.is_empty()).then_some(port)
}

fn is_valid_port(port: &str) -> bool {
    port.bytes().all(|b| b.is_ascii_digit())
        && port
            .parse::<u32>()
            .is_ok_and(|p| (1..=65535).contains(&p))
}
