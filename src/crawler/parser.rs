//! HTML parser for extracting links
//!
//! Returns the raw `href` values of a document's anchors. Resolution into
//! absolute URLs is left to the canonicalizer so both sides agree on identity.

use scraper::{Html, Selector};

/// Extracts every anchor `href` from an HTML document
///
/// Values are returned as written in the document, in document order. Anchors
/// with the `download` attribute are skipped since they point at files, not
/// pages. Unparsable input yields whatever the lenient HTML parser recovered,
/// never an error.
///
/// # Example
///
/// ```
/// use tether::crawler::extract_links;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// assert_eq!(extract_links(html), vec!["/page".to_string()]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                links.push(href.to_string());
            }
        }
    }

    links
}
