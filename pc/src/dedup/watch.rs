//! Watch-list of URLs that receive deduplication

use regex::Regex;
use tracing::debug;

use super::DedupError;

/// Prefix marking a watch pattern as a regular expression
pub const REGEX_PREFIX: &str = "re:";

/// One watched URL pattern
#[derive(Debug, Clone)]
pub enum WatchPattern {
    /// Matches when the URL contains this text
    Substring(String),
    /// Matches when the regex finds a match anywhere in the URL
    Regex(Regex),
}

impl WatchPattern {
    /// Parse a config entry; `re:<pattern>` is a regex, anything else a substring
    pub fn parse(raw: &str) -> Result<Self, DedupError> {
        if raw.is_empty() {
            return Err(DedupError::InvalidPattern {
                pattern: raw.to_string(),
                message: "empty pattern would watch every URL".to_string(),
            });
        }

        match raw.strip_prefix(REGEX_PREFIX) {
            Some(expr) => Regex::new(expr)
                .map(WatchPattern::Regex)
                .map_err(|e| DedupError::InvalidPattern {
                    pattern: raw.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(WatchPattern::Substring(raw.to_string())),
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            WatchPattern::Substring(needle) => url.contains(needle.as_str()),
            WatchPattern::Regex(re) => re.is_match(url),
        }
    }
}

/// Ordered set of watched patterns; empty means nothing is deduplicated
#[derive(Debug, Clone, Default)]
pub struct WatchList {
    patterns: Vec<WatchPattern>,
}

impl WatchList {
    pub fn new(patterns: Vec<WatchPattern>) -> Self {
        Self { patterns }
    }

    /// Parse every entry, failing on the first invalid one
    pub fn parse<I, S>(raw: I) -> Result<Self, DedupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = raw
            .into_iter()
            .map(|p| WatchPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = patterns.len(), "WatchList::parse: parsed patterns");
        Ok(Self { patterns })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(url))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_matches_anywhere() {
        let list = WatchList::parse(["/api/pagar"]).unwrap();
        assert!(list.matches("/api/pagar"));
        assert!(list.matches("https://shop.example.com/api/pagar?retry=1"));
        assert!(!list.matches("/api/other-endpoint"));
    }

    #[test]
    fn test_regex_pattern() {
        let list = WatchList::parse(["re:^/api/(pagar|checkout)$"]).unwrap();
        assert!(list.matches("/api/checkout"));
        assert!(list.matches("/api/pagar"));
        assert!(!list.matches("/api/pagar/status"));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let err = WatchList::parse(["/api/pagar", "re:(unclosed"]).unwrap_err();
        match err {
            DedupError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "re:(unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert!(WatchPattern::parse("").is_err());
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let list = WatchList::default();
        assert!(list.is_empty());
        assert!(!list.matches("/api/pagar"));
    }
}
