//! URL extraction from free-form message text.
//!
//! Candidates are anything that looks like `http://` or `https://` followed
//! by non-whitespace. Each candidate is then parsed; chat text is full of
//! URL-shaped noise, so a candidate that fails to parse is dropped without
//! complaint.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL pattern is a valid regex"));

/// A URL found in a message.
///
/// Keeps the raw text as written (the default resolver fetches exactly that)
/// next to the parsed form and a normalized path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundUrl {
    raw: String,
    url: Url,
    path: String,
}

impl FoundUrl {
    /// Parses one candidate.
    ///
    /// Returns `None` unless the candidate is an absolute `http`/`https` URL
    /// with a host.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut url = Url::parse(raw).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
            return None;
        }

        let path = url.path();
        let path = path.strip_suffix('/').unwrap_or(path).to_string();
        url.set_path(&path);

        Some(Self {
            raw: raw.to_string(),
            url,
            path,
        })
    }

    /// The URL exactly as it appeared in the message.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed URL, carrying the normalized path.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The lowercased host, without port.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// The path with a single trailing `/` removed.
    ///
    /// A bare `https://example.com/` has an empty path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }
}

/// Returns every URL-shaped substring in `text`, left to right.
///
/// Duplicates are kept; each occurrence is dispatched on its own.
pub fn find_raw_urls(text: &str) -> Vec<&str> {
    URL_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Finds and parses every URL in `text`, left to right.
pub fn extract_urls(text: &str) -> Vec<FoundUrl> {
    find_raw_urls(text)
        .into_iter()
        .filter_map(FoundUrl::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_urls_in_order() {
        let text = "first https://a.example/x then http://b.example and done";
        assert_eq!(
            find_raw_urls(text),
            vec!["https://a.example/x", "http://b.example"]
        );
    }

    #[test]
    fn test_keeps_duplicates() {
        let urls = extract_urls("https://a.example https://a.example");
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], urls[1]);
    }

    #[test]
    fn test_ignores_other_schemes() {
        assert!(extract_urls("ftp://files.example/x and mailto:me@example.com").is_empty());
    }

    #[test]
    fn test_url_ends_at_whitespace() {
        let raw = find_raw_urls("look\thttps://a.example/p?q=1\nnext line");
        assert_eq!(raw, vec!["https://a.example/p?q=1"]);
    }

    #[test]
    fn test_unparseable_candidate_is_dropped() {
        let urls = extract_urls("broken http://[not-an-ip/ fine https://ok.example");
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].host(), "ok.example");
    }

    #[test]
    fn test_hostless_candidate_is_dropped() {
        assert!(extract_urls("http://:80/nothing").is_empty());
    }

    #[test]
    fn test_strips_one_trailing_slash_from_path() {
        let url = FoundUrl::parse("https://github.com/rust-lang/rust/").unwrap();
        assert_eq!(url.path(), "/rust-lang/rust");
        assert_eq!(url.url().as_str(), "https://github.com/rust-lang/rust");

        let root = FoundUrl::parse("https://xkcd.com/").unwrap();
        assert_eq!(root.path(), "");

        let double = FoundUrl::parse("https://a.example/x//").unwrap();
        assert_eq!(double.path(), "/x/");
    }

    #[test]
    fn test_query_is_untouched() {
        let url = FoundUrl::parse("https://a.example/search/?q=a/").unwrap();
        assert_eq!(url.path(), "/search");
        assert_eq!(url.query(), Some("q=a/"));
        assert_eq!(url.raw(), "https://a.example/search/?q=a/");
    }

    #[test]
    fn test_host_is_lowercased_without_port() {
        let url = FoundUrl::parse("http://WWW.Example.COM:8080/a").unwrap();
        assert_eq!(url.host(), "www.example.com");
    }
}
