/// Link state definitions
///
/// A link state is the outcome of classifying one fetch. It is never stored
/// beyond the worker that computed it.
use std::fmt;

/// Represents what a single fetch said about a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// The server answered with a success status (200, 201 or 202)
    Reachable,

    /// The server answered HTTP 429; the link is neither broken nor working yet
    RateLimited,

    /// Transport failure or any other status code
    Unreachable,
}

impl LinkState {
    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reachable => "reachable",
            Self::RateLimited => "rate_limited",
            Self::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
