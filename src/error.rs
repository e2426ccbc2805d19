//! Error types for the extraction pipeline.
//!
//! Two layers exist:
//!
//! - [`FetchError`]: the fetcher's own taxonomy, used by the retry policy to
//!   decide whether another attempt is worthwhile.
//! - [`ScrapeError`]: the single caller-facing type returned by
//!   [`Extractor::extract`](crate::Extractor::extract). Every failure ends up
//!   here, and [`ScrapeError::user_message`] picks the human-readable text.

use reqwest::StatusCode;

/// Failure of a single HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered 403, even after the alternate User-Agent.
    #[error("access denied (HTTP 403)")]
    AccessDenied,

    /// Any other non-success status.
    #[error("HTTP error {0}")]
    HttpError(u16),

    /// Connection, TLS, DNS or body-decoding failure.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Timeouts, network errors, 408, 429 and 5xx are transient. Other client
    /// errors (404, 410, a 403 that survived the User-Agent swap) are not.
    /// The default backoff policy retries both kinds; see
    /// [`RetryPolicy`](crate::fetch::retry::RetryPolicy).
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::NetworkError(_) => true,
            FetchError::AccessDenied => false,
            FetchError::HttpError(status) => {
                *status == StatusCode::REQUEST_TIMEOUT.as_u16()
                    || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
                    || *status >= 500
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::HttpError(status.as_u16())
        } else {
            FetchError::NetworkError(err.to_string())
        }
    }
}

/// The caller-facing error of an extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("timed out while fetching the page")]
    FetchTimeout,

    #[error("access denied by the site")]
    AccessDenied,

    #[error("HTTP error {0}")]
    HttpError(u16),

    #[error("no readable content found")]
    NoContentFound,

    #[error("invalid API response: {0}")]
    InvalidApiResponse(String),

    #[error("extraction cancelled")]
    Cancelled,

    #[error("failed to scrape content: {0}")]
    ScrapeFailed(String),
}

impl ScrapeError {
    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ScrapeError::InvalidUrl(_) => "Invalid URL format",
            ScrapeError::FetchTimeout => {
                "The website took too long to respond. Please try again later."
            }
            ScrapeError::AccessDenied => {
                "Access to this website is restricted. Try a different article or source."
            }
            ScrapeError::NoContentFound => "Could not find readable content on this page.",
            ScrapeError::Cancelled => "The request was cancelled.",
            ScrapeError::HttpError(_)
            | ScrapeError::InvalidApiResponse(_)
            | ScrapeError::ScrapeFailed(_) => "Failed to scrape content from URL",
        }
    }
}

impl From<FetchError> for ScrapeError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout => ScrapeError::FetchTimeout,
            FetchError::AccessDenied => ScrapeError::AccessDenied,
            FetchError::HttpError(status) => ScrapeError::HttpError(status),
            FetchError::NetworkError(msg) => ScrapeError::ScrapeFailed(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::NetworkError("reset".into()).is_transient());
        assert!(FetchError::HttpError(503).is_transient());
        assert!(FetchError::HttpError(429).is_transient());
        assert!(FetchError::HttpError(408).is_transient());
        assert!(!FetchError::HttpError(404).is_transient());
        assert!(!FetchError::AccessDenied.is_transient());
    }

    #[test]
    fn test_fetch_error_maps_to_scrape_error() {
        assert_eq!(ScrapeError::from(FetchError::Timeout), ScrapeError::FetchTimeout);
        assert_eq!(ScrapeError::from(FetchError::AccessDenied), ScrapeError::AccessDenied);
        assert_eq!(ScrapeError::from(FetchError::HttpError(500)), ScrapeError::HttpError(500));
        assert!(matches!(
            ScrapeError::from(FetchError::NetworkError("dns".into())),
            ScrapeError::ScrapeFailed(msg) if msg == "dns"
        ));
    }

    #[test]
    fn test_user_messages_distinguish_taxonomy() {
        assert!(ScrapeError::FetchTimeout.user_message().contains("too long"));
        assert!(ScrapeError::AccessDenied.user_message().contains("restricted"));
        assert_eq!(
            ScrapeError::HttpError(500).user_message(),
            ScrapeError::ScrapeFailed("x".into()).user_message()
        );
    }
}
