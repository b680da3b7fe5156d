//! Login form heuristics.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::utils::parse_selector_with_fallback;

/// Substrings of input attributes that suggest a credential field.
const AUTH_FIELD_HINTS: &[&str] = &[
    "login", "signin", "sign-in", "username", "user", "email", "e-mail", "pwd", "password",
    "passcode",
];

/// Input attributes inspected for `AUTH_FIELD_HINTS`.
const HINT_ATTRIBUTES: &[&str] = &["name", "id", "autocomplete", "placeholder"];

/// Phrases in button/link text that suggest a sign-in call to action.
const AUTH_CTA_PHRASES: &[&str] = &["log in", "signin", "sign in", "account"];

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("form", "login form detection"));
static INPUT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("input", "login form detection"));
static BUTTON_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("button", "login form detection"));
static CTA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("button, a", "login CTA detection"));

/// True if the page has a login form or a sign-in call to action.
pub fn detect_login(document: &Html) -> bool {
    has_login_form(document) || has_auth_cta(document)
}

/// A form with a password input, or with a credential-looking input and
/// something to submit it with.
pub fn has_login_form(document: &Html) -> bool {
    document.select(&FORM_SELECTOR).any(|form| {
        let inputs: Vec<ElementRef<'_>> = form.select(&INPUT_SELECTOR).collect();

        if inputs.iter().any(|input| input_type_is(input, "password")) {
            return true;
        }

        let has_auth_field = inputs.iter().any(|input| {
            HINT_ATTRIBUTES
                .iter()
                .filter_map(|attr| input.value().attr(attr))
                .any(has_auth_hint)
        });
        if !has_auth_field {
            return false;
        }

        form.select(&BUTTON_SELECTOR).next().is_some()
            || inputs
                .iter()
                .any(|input| input_type_is(input, "submit") || input_type_is(input, "button"))
    })
}

/// A `<button>` or `<a>` whose text reads like "log in" / "sign in" / "account".
pub fn has_auth_cta(document: &Html) -> bool {
    document.select(&CTA_SELECTOR).any(|element| {
        let text = element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        AUTH_CTA_PHRASES.iter().any(|phrase| text.contains(phrase))
    })
}

fn input_type_is(input: &ElementRef<'_>, expected: &str) -> bool {
    input
        .value()
        .attr("type")
        .is_some_and(|t| t.trim().eq_ignore_ascii_case(expected))
}

fn has_auth_hint(value: &str) -> bool {
    let value = value.to_lowercase();
    AUTH_FIELD_HINTS.iter().any(|hint| value.contains(hint))
}
