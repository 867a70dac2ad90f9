//! Crawl report rendering
//!
//! Turns a [`CrawlResult`] into either a plain-text report (one `BROKEN:` line
//! per broken link, then a summary) or its JSON form.

use crate::crawler::CrawlResult;

/// Formats a crawl result as a plain-text report
///
/// # Arguments
///
/// * `result` - The crawl result
///
/// # Returns
///
/// The report, ending with a newline
pub fn format_report(result: &CrawlResult) -> String {
    let mut out = String::new();

    for url in &result.broken {
        out.push_str(&format!("BROKEN: {}\n", url));
    }

    if !result.rate_limited.is_empty() {
        if !result.broken.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!(
            "Rate limited, not checked ({}):\n",
            result.rate_limited.len()
        ));
        for url in &result.rate_limited {
            out.push_str(&format!("  - {}\n", url));
        }
    }

    if !out.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!(
        "Checked {} links: {} working, {} broken, {} rate limited\n",
        result.total(),
        result.working.len(),
        result.broken.len(),
        result.rate_limited.len()
    ));

    out
}

/// Prints the plain-text report to stdout
pub fn print_report(result: &CrawlResult) {
    print!("{}", format_report(result));
}

/// Renders a crawl result as pretty-printed JSON
pub fn render_json(result: &CrawlResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}
