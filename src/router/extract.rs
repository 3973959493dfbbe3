//! Picks the renderable part out of a fetched HTML fragment.
//!
//! Fragment files follow a fixed contract: the router slot
//! (`data-router-content`) if present, otherwise `<main>`, otherwise `<body>`.
//! Markup is parsed as a full document, so bare markup lands in `<body>` and a
//! document with only a `<head>` has an empty body.

use scraper::{Html, Selector};

/// Attribute marking the router's content slot inside a fragment file.
pub const CONTENT_SLOT_ATTR: &str = "data-router-content";

const REGIONS: [&str; 3] = ["[data-router-content]", "main", "body"];

/// Returns the inner markup of the preferred region, or `None` when the
/// fragment carries nothing renderable.
pub fn extract_fragment(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let inner = REGIONS
        .iter()
        .find_map(|region| region_html(&document, region))?;

    let inner = inner.trim();
    (!inner.is_empty()).then(|| inner.to_string())
}

/// Inner markup of the first element matching `selector`.
fn region_html(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.inner_html())
}
