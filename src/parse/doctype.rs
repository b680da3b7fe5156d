//! HTML version detection from the document type declaration.

use scraper::{Html, Node};

/// Label reported when there is no usable doctype.
pub const UNKNOWN_DOCTYPE: &str = "unknown";

/// Returns the version label of the first doctype that is a direct child of the
/// document root, or `"unknown"` when there is none.
pub fn detect_html_version(document: &Html) -> String {
    document
        .tree
        .root()
        .children()
        .find_map(|child| match child.value() {
            Node::Doctype(doctype) => Some(classify_doctype(
                doctype.name(),
                doctype.public_id(),
                doctype.system_id(),
            )),
            _ => None,
        })
        .unwrap_or_else(|| UNKNOWN_DOCTYPE.to_string())
}

/// Maps doctype name and identifiers to a version label.
///
/// Rules are evaluated in order and the first match wins. Identifiers are
/// compared case-insensitively.
pub fn classify_doctype(name: &str, public_id: &str, system_id: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    if name != "html" {
        if name.is_empty() {
            return UNKNOWN_DOCTYPE.to_string();
        }
        return name.to_ascii_uppercase();
    }

    let public_id = public_id.trim().to_ascii_lowercase();
    let system_id = system_id.trim().to_ascii_lowercase();

    let label = if public_id.is_empty() && system_id.is_empty() {
        "HTML5"
    } else if public_id.is_empty() && system_id == "about:legacy-compat" {
        "HTML5 (legacy-compat)"
    } else if public_id.contains("xhtml 1.1") {
        "XHTML 1.1"
    } else if public_id.contains("xhtml 1.0") {
        match variant(&public_id) {
            Some(Variant::Strict) => "XHTML 1.0 Strict",
            Some(Variant::Transitional) => "XHTML 1.0 Transitional",
            Some(Variant::Frameset) => "XHTML 1.0 Frameset",
            None => "XHTML 1.0",
        }
    } else if public_id.contains("html 4.01") {
        match variant(&public_id) {
            Some(Variant::Strict) => "HTML 4.01 Strict",
            Some(Variant::Transitional) => "HTML 4.01 Transitional",
            Some(Variant::Frameset) => "HTML 4.01 Frameset",
            None => "HTML 4.01",
        }
    } else if public_id.contains("html 4.0") {
        "HTML 4.0"
    } else if public_id.contains("html 3.2") {
        "HTML 3.2"
    } else if public_id.contains("html 2.0") {
        "HTML 2.0"
    } else {
        "HTML (doctype with identifiers)"
    };
    label.to_string()
}

enum Variant {
    Strict,
    Transitional,
    Frameset,
}

fn variant(public_id: &str) -> Option<Variant> {
    if public_id.contains("strict") {
        Some(Variant::Strict)
    } else if public_id.contains("transitional") {
        Some(Variant::Transitional)
    } else if public_id.contains("frameset") {
        Some(Variant::Frameset)
    } else {
        None
    }
}
