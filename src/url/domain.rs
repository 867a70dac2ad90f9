use std::fmt;
use url::Url;

/// The host (and optional explicit port) a crawl is restricted to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain {
    host: String,
    port: Option<u16>,
}

impl Domain {
    /// Creates a domain from a host and an optional port
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into().to_lowercase(),
            port,
        }
    }

    /// The host without any port
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The explicit port, if the root URL carried one
    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

/// Extracts the crawl domain from a root URL
///
/// Scheme-less input is accepted and read as if it were `https://`. A port is
/// only kept when it differs from the scheme's default.
///
/// # Examples
///
/// ```
/// use tether::url::extract_domain;
///
/// let domain = extract_domain("https://google.com/search").unwrap();
/// assert_eq!(domain.to_string(), "google.com");
///
/// let domain = extract_domain("google.com:8080/search/more").unwrap();
/// assert_eq!(domain.to_string(), "google.com:8080");
/// ```
pub fn extract_domain(url: &str) -> Option<Domain> {
    let url = url.trim();
    if url.starts_with('/') {
        return None;
    }

    let parsed = if url.contains("://") {
        Url::parse(url)
    } else {
        Url::parse(&format!("https://{}", url))
    }
    .ok()?;

    let host = parsed.host_str().filter(|h| !h.is_empty())?;
    Some(Domain::new(host, parsed.port()))
}

/// Checks whether a canonical URL belongs to the crawl domain
///
/// Host and port are compared separately. When the domain has no port, any port
/// on the URL matches; when it has one, the URL's effective port must equal it.
/// There is no subdomain or `www.` matching here, see [`DomainScope`] for that.
/// Malformed URLs are never in the domain.
pub fn is_in_domain(url: &str, domain: &Domain) -> bool {
    DomainScope::exact(domain.clone()).contains(url)
}

/// A domain plus the policy used to match hosts against it
#[derive(Debug, Clone)]
pub struct DomainScope {
    domain: Domain,
    include_www: bool,
}

impl DomainScope {
    /// Creates a scope with an explicit `www.` policy
    pub fn new(domain: Domain, include_www: bool) -> Self {
        Self {
            domain,
            include_www,
        }
    }

    /// Creates a scope that only matches the exact host
    pub fn exact(domain: Domain) -> Self {
        Self::new(domain, false)
    }

    /// The underlying crawl domain
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Returns true if `url` is on the crawled site
    pub fn contains(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::trace!("Excluding malformed URL {}: {}", url, e);
                return false;
            }
        };

        let host = match parsed.host_str() {
            Some(host) => host.to_lowercase(),
            None => return false,
        };

        if !self.host_matches(&host) {
            return false;
        }

        match self.domain.port {
            Some(port) => parsed.port_or_known_default() == Some(port),
            None => true,
        }
    }

    fn host_matches(&self, host: &str) -> bool {
        let wanted = self.domain.host();
        if host == wanted {
            return true;
        }
        if !self.include_www {
            return false;
        }
        strip_www(host) == strip_www(wanted)
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
