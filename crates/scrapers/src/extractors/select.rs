// ABOUTME: Selector-based value extraction scoped to a single listing fragment.
// ABOUTME: Specs are tried in order and the first non-empty value wins.

//! Fragment-scoped field extraction.
//!
//! A site describes each field as an ordered list of [`SelectorSpec`]s. The
//! first spec that yields a non-empty, whitespace-normalized value wins, which
//! is how every fallback chain (title label then span, discounted price then
//! basket price, `data-src` then `src`) is expressed.

use scraper::ElementRef;

use crate::extractors::compiled::get_or_compile;

/// How to read one candidate value from a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorSpec {
    /// Inner text of the first descendant matching the selector.
    Text(&'static str),
    /// Attribute of the first descendant matching the selector.
    Attr(&'static str, &'static str),
    /// Attribute on the fragment element itself.
    OwnAttr(&'static str),
}

/// Collapses runs of whitespace into single spaces and trims.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the first non-empty value produced by `specs`, in order.
pub fn first_value(fragment: ElementRef<'_>, specs: &[SelectorSpec]) -> Option<String> {
    specs.iter().find_map(|spec| value_from_spec(fragment, spec))
}

/// Returns the normalized text of every descendant matching `css`, including empty ones.
///
/// Used where a site forces a scan over candidates instead of a direct lookup.
pub fn texts(fragment: ElementRef<'_>, css: &str) -> Vec<String> {
    let Some(selector) = get_or_compile(css) else {
        return vec![];
    };
    fragment
        .select(&selector)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .collect()
}

/// Returns the first descendant matching `css`.
pub fn first_element<'a>(fragment: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = get_or_compile(css)?;
    fragment.select(&selector).next()
}

fn value_from_spec(fragment: ElementRef<'_>, spec: &SelectorSpec) -> Option<String> {
    let raw = match *spec {
        SelectorSpec::Text(css) => {
            let el = first_element(fragment, css)?;
            normalize_whitespace(&el.text().collect::<String>())
        }
        SelectorSpec::Attr(css, attr) => {
            let el = first_element(fragment, css)?;
            el.value().attr(attr)?.trim().to_string()
        }
        SelectorSpec::OwnAttr(attr) => fragment.value().attr(attr)?.trim().to_string(),
    };
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}
