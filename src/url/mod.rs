//! URL handling module for Tether
//!
//! This module provides link canonicalization, crawl domain extraction, and the
//! domain filter that decides which pages are fetched in full.

mod canonicalize;
mod domain;

// Re-export main functions
pub use canonicalize::{canonicalize, resolve_root};
pub use domain::{extract_domain, is_in_domain, Domain, DomainScope};
