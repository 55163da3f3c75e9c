//! Hostname blocklist for evidence filtering.
//!
//! Search results whose host matches a blocked category (adult content,
//! gambling, and similar) are dropped before they reach the verification
//! step. Patterns are matched as case-insensitive substrings of the URL host;
//! URLs that fail to parse are matched against the whole URL string so a
//! malformed link cannot slip past the filter.

use tracing::warn;
use url::Url;

/// Default blocked hostname patterns.
const DEFAULT_PATTERNS: &[&str] = &[
    "porn", "xxx", "sex", "adult", "xvideos", "pornhub", "xhamster", "redtube", "youporn",
    "tube8", "spankbang", "xnxx", "onlyfans", "escort", "casino", "gambling",
];

/// A configurable set of hostname patterns that disqualify evidence URLs.
#[derive(Debug, Clone)]
pub struct HostBlocklist {
    patterns: Vec<String>,
}

impl Default for HostBlocklist {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS.iter().map(|p| p.to_string()))
    }
}

impl HostBlocklist {
    /// Build a blocklist from hostname patterns. Patterns are lowercased;
    /// empty patterns are ignored.
    pub fn new(patterns: impl IntoIterator<Item = String>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Number of configured patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the blocklist has no patterns at all.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true when the URL's host matches any blocked pattern.
    pub fn is_blocked(&self, raw_url: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let haystack = match Url::parse(raw_url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_lowercase(),
                None => raw_url.to_lowercase(),
            },
            Err(_) => {
                warn!(url = %raw_url, "unparseable evidence URL, matching against raw string");
                raw_url.to_lowercase()
            }
        };
        self.patterns.iter().any(|p| haystack.contains(p.as_str()))
    }
}
