use crate::url::domain::{extract_domain, Domain};
use crate::UrlError;
use url::Url;

/// Turns a discovered href into the absolute form used as its identity
///
/// # Rules
///
/// 1. Anything containing a `:` already names its scheme and is returned as is
///    (`mailto:` and friends included; they classify as unreachable later)
/// 2. A path starting with `/` is placed on the crawl domain over `https`
/// 3. Anything else gets `https://` prepended
///
/// Applying the function twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use tether::url::{canonicalize, Domain};
///
/// let domain = Domain::new("google.com", None);
/// assert_eq!(canonicalize("/more", &domain), "https://google.com/more");
/// assert_eq!(canonicalize("google.com/more", &domain), "https://google.com/more");
/// assert_eq!(canonicalize("https://google.com/more", &domain), "https://google.com/more");
/// ```
pub fn canonicalize(raw: &str, domain: &Domain) -> String {
    let raw = raw.trim();

    if raw.contains(':') {
        return raw.to_string();
    }

    if raw.starts_with('/') {
        return format!("https://{}{}", domain, raw);
    }

    format!("https://{}", raw)
}

/// Resolves the root URL of a crawl into its canonical form and domain
///
/// This is the only place a URL problem is fatal: a root without a usable host
/// cannot be crawled at all.
pub fn resolve_root(root: &str) -> Result<(String, Domain), UrlError> {
    let domain = extract_domain(root).ok_or(UrlError::MissingHost)?;
    let canonical = canonicalize(root, &domain);

    let parsed = Url::parse(&canonical).map_err(|e| UrlError::Parse(e.to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok((canonical, domain))
}
