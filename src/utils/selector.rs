//! CSS selector construction for the static selectors used by the inspector.

use scraper::Selector;

/// Parses `selector_str`, falling back to a selector that matches nothing.
///
/// Static selectors are compile-time constants; a parse failure is logged
/// with `context` rather than taking the process down.
pub fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        log::error!("Failed to parse CSS selector '{selector_str}' ({context}): {e}");
        Selector::parse("*:not(*)").expect("fallback selector '*:not(*)' always parses")
    })
}
