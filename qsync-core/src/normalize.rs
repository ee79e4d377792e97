//! Order-independent comparison keys for query strings

use std::fmt;

/// Normalized form of a query string, used only to tell whether two
/// query strings carry the same parameters.
///
/// The leading `?` (if any) is kept as a prefix and the `&`-separated pairs
/// are sorted byte-wise. Nothing is decoded or deduplicated.
#[derive(Debug, Clone, Default)]
pub struct CanonicalQuery {
    text: String,
    prefix_len: usize,
}

impl CanonicalQuery {
    pub fn new(query: &str) -> Self {
        let (prefix, params) = match query.strip_prefix('?') {
            Some(rest) => ("?", rest),
            None => ("", query),
        };

        let mut pairs: Vec<&str> = params.split('&').collect();
        pairs.sort_unstable();

        let mut text = String::with_capacity(query.len());
        text.push_str(prefix);
        text.push_str(&pairs.join("&"));

        Self {
            text,
            prefix_len: prefix.len(),
        }
    }

    /// Full canonical text, prefix included.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The sorted pairs without the `?` prefix.
    pub fn params(&self) -> &str {
        &self.text[self.prefix_len..]
    }

    pub fn has_params(&self) -> bool {
        !self.params().is_empty()
    }

    /// Search component to append to a pathname when navigating.
    ///
    /// A query with no parameters yields an empty string rather than a bare `?`.
    pub fn to_search(&self) -> String {
        if self.has_params() {
            format!("?{}", self.params())
        } else {
            String::new()
        }
    }
}

// Equality looks at the parameters only, so `?` and `` compare equal.
impl PartialEq for CanonicalQuery {
    fn eq(&self, other: &Self) -> bool {
        self.params() == other.params()
    }
}

impl Eq for CanonicalQuery {}

impl std::hash::Hash for CanonicalQuery {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.params().hash(state);
    }
}

impl fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Normalize a query string for equality comparison.
pub fn normalize(query: &str) -> CanonicalQuery {
    CanonicalQuery::new(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_pairs() {
        assert_eq!(normalize("?b=2&a=1").as_str(), "?a=1&b=2");
        assert_eq!(normalize("?a=1&b=2").as_str(), "?a=1&b=2");
    }

    #[test]
    fn test_no_prefix_is_not_introduced() {
        assert_eq!(normalize("b=2&a=1").as_str(), "a=1&b=2");
        assert_eq!(normalize("a=1&b=2").as_str(), "a=1&b=2");
    }

    #[test]
    fn test_empty_queries() {
        assert_eq!(normalize("").as_str(), "");
        assert_eq!(normalize("?").as_str(), "?");
        assert!(!normalize("?").has_params());
        assert_eq!(normalize("?"), normalize(""));
    }

    #[test]
    fn test_only_one_prefix_is_stripped() {
        assert_eq!(normalize("??b&a").as_str(), "??b&a");
        assert_eq!(normalize("??b&a").params(), "?b&a");
    }

    #[test]
    fn test_does_not_decode_or_dedupe() {
        assert_eq!(normalize("?b=%20&a=1&a=1").as_str(), "?a=1&a=1&b=%20");
        assert_ne!(normalize("?a=%20"), normalize("?a=+"));
    }

    #[test]
    fn test_repeated_keys_sort_by_value() {
        assert_eq!(normalize("?tag=z&tag=a").as_str(), "?tag=a&tag=z");
    }

    #[test]
    fn test_empty_segments_are_kept() {
        assert_eq!(normalize("?b=2&&a=1").as_str(), "?&a=1&b=2");
    }

    #[test]
    fn test_to_search() {
        assert_eq!(normalize("?b=2&a=1").to_search(), "?a=1&b=2");
        assert_eq!(normalize("b=2&a=1").to_search(), "?a=1&b=2");
        assert_eq!(normalize("?").to_search(), "");
        assert_eq!(normalize("").to_search(), "");
    }

    #[test]
    fn test_display_matches_as_str() {
        let query = normalize("?z=9&y=8");
        assert_eq!(query.to_string(), query.as_str());
    }
}
