//! Output module for crawl reports
//!
//! This module handles:
//! - Plain-text reports listing broken links
//! - JSON rendering of the full crawl result

mod report;

pub use report::{format_report, print_report, render_json};
