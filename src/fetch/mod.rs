//! HTML fetching with browser-like headers, a 403 User-Agent swap and
//! exponential backoff.
//!
//! The pieces compose the same way for every caller:
//!
//! - [`normalize_url`] cleans user input and rejects malformed URLs before any
//!   network call is made.
//! - [`FetchRequest`] carries the URL, headers and timeout of one attempt.
//! - [`FetchPage`] is the seam: [`HttpFetcher`] talks to the network,
//!   [`RetryFetch`] wraps any implementation with the backoff policy.

pub mod http;
pub mod retry;

pub use http::HttpFetcher;
pub use retry::{RetryFetch, RetryPolicy};

use crate::config::ExtractorConfig;
use crate::error::FetchError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use std::time::Duration;
use url::Url;

const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const JSON_ACCEPT: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// Permissive shape check: scheme, a dotted host with an alphabetic TLD (or
/// `localhost` / an IPv4 literal), optional port, then anything without
/// whitespace.
static URL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[\da-z](?:[\da-z-]*[\da-z])?\.)+[a-z]{2,}|localhost|\d{1,3}(?:\.\d{1,3}){3})(?::\d{1,5})?(?:[/?#]\S*)?$",
    )
    .ok()
});

/// Clean and validate a user-supplied URL.
///
/// Leading whitespace and `@` are stripped and `https://` is prefixed when no
/// scheme is present, so `example.com/post` becomes `https://example.com/post`.
pub fn normalize_url(input: &str) -> Result<Url, String> {
    let trimmed = input.trim().trim_start_matches('@').trim();
    let candidate = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let matches = URL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(&candidate));
    if !matches {
        return Err(format!("'{input}' does not look like a web address"));
    }

    Url::parse(&candidate).map_err(|e| format!("'{input}': {e}"))
}

/// One HTTP exchange to perform.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl FetchRequest {
    /// An HTML page request; `Referer` and `Origin` point at the page itself.
    pub fn page(url: Url, config: &ExtractorConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        insert_referer(&mut headers, &url);
        Self {
            url,
            headers,
            timeout: config.request_timeout(),
        }
    }

    /// A JSON API request made on behalf of `referer`.
    pub fn json(url: Url, referer: &Url, config: &ExtractorConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        insert_referer(&mut headers, referer);
        Self {
            url,
            headers,
            timeout: config.request_timeout(),
        }
    }
}

fn insert_referer(headers: &mut HeaderMap, referer: &Url) {
    if let Ok(value) = HeaderValue::from_str(referer.as_str()) {
        headers.insert(REFERER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&referer.origin().ascii_serialization()) {
        headers.insert(ORIGIN, value);
    }
}

/// A successfully fetched response body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Something that can perform a [`FetchRequest`].
pub trait FetchPage {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme() {
        let url = normalize_url("example.com/post").unwrap();
        assert_eq!(url.as_str(), "https://example.com/post");
    }

    #[test]
    fn test_normalize_strips_at_and_whitespace() {
        let url = normalize_url("  @https://news.example.org/a/b?x=1#top ").unwrap();
        assert_eq!(url.as_str(), "https://news.example.org/a/b?x=1#top");
    }

    #[test]
    fn test_normalize_keeps_http() {
        let url = normalize_url("http://blog.example.co.uk").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("blog.example.co.uk"));
    }

    #[test]
    fn test_normalize_accepts_local_addresses() {
        assert!(normalize_url("http://127.0.0.1:8080/article").is_ok());
        assert!(normalize_url("http://localhost:3000").is_ok());
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_url("").is_err());
        assert!(normalize_url("not a url").is_err());
        assert!(normalize_url("https://nodot").is_err());
        assert!(normalize_url("https://exa mple.com/").is_err());
        assert!(normalize_url("ftp://example.com/file").is_err());
    }

    #[test]
    fn test_page_request_headers() {
        let url = Url::parse("https://example.com/a/b").unwrap();
        let request = FetchRequest::page(url, &ExtractorConfig::default());
        assert_eq!(request.headers[REFERER], "https://example.com/a/b");
        assert_eq!(request.headers[ORIGIN], "https://example.com");
        assert!(request.headers[ACCEPT].to_str().unwrap().starts_with("text/html"));
        assert_eq!(request.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_json_request_headers() {
        let api = Url::parse("https://pub.substack.com/api/v1/posts/x").unwrap();
        let page = Url::parse("https://pub.substack.com/p/x").unwrap();
        let request = FetchRequest::json(api, &page, &ExtractorConfig::default());
        assert!(request.headers[ACCEPT].to_str().unwrap().starts_with("application/json"));
        assert_eq!(request.headers[REFERER], "https://pub.substack.com/p/x");
    }
}
