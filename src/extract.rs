//! The extraction pipeline.
//!
//! ```text
//! url ─ normalize ─┬─ Substack post? ── JSON API ──────────────┐
//!                  │        └─ any failure ─┐                  │
//!                  └────────────────────────┴─ fetch HTML      │
//!                                               │              │
//!                                     metadata + content       │
//!                                               │              │
//!                                          ScrapeResult ◄──────┘
//! ```
//!
//! [`Extractor`] owns the HTTP client and the backoff policy and is cheap to
//! share between concurrent extractions. [`extract_from_html`] is the pure
//! tail of the pipeline for markup the caller already has.

use crate::config::ExtractorConfig;
use crate::content::extract_content;
use crate::error::{Result, ScrapeError};
use crate::fetch::{FetchPage, FetchRequest, HttpFetcher, RetryFetch, normalize_url};
use crate::metadata::extract_metadata;
use crate::models::{ScrapeResult, UNTITLED};
use crate::page::Page;
use crate::provider::{ArticleSource, substack};
use crate::reading::{estimate_read_time, word_count};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Build a result from already-fetched HTML.
///
/// # Arguments
/// * `html` - The raw document
/// * `page_url` - Where the document was served from; relative links and
///   images resolve against it
/// * `words_per_minute` - Reading speed for the estimate
///
/// # Returns
/// * `Err(ScrapeError::NoContentFound)` when no candidate yields text
#[instrument(level = "debug", skip(html), fields(url = %page_url, bytes = html.len()))]
pub fn extract_from_html(html: &str, page_url: &Url, words_per_minute: usize) -> Result<ScrapeResult> {
    let page = Page::parse(html, page_url.clone());
    let content = extract_content(&page)?;
    debug!(source = ?content.source, "Content located");

    let metadata = extract_metadata(&page);
    let words = word_count(&content.text);

    Ok(ScrapeResult {
        title: metadata.title.unwrap_or_else(|| UNTITLED.to_string()),
        content: content.text,
        description: metadata.description,
        estimated_read_time_minutes: estimate_read_time(words, words_per_minute),
        image_url: metadata.image_url,
        author: metadata.author,
        publish_date: metadata.publish_date,
    })
}

/// Fetches URLs and turns them into [`ScrapeResult`]s.
///
/// The fetcher defaults to the reqwest-backed [`HttpFetcher`]; any
/// [`FetchPage`] can stand in via [`with_fetcher`](Self::with_fetcher).
#[derive(Debug)]
pub struct Extractor<F = HttpFetcher> {
    config: ExtractorConfig,
    fetcher: RetryFetch<F>,
}

impl Extractor<HttpFetcher> {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ScrapeError::ScrapeFailed(e.to_string()))?;
        let http = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, http)
    }
}

impl<F> Extractor<F>
where
    F: FetchPage,
{
    /// Build an extractor around an existing fetcher. Page fetches get the
    /// configured backoff; Substack API calls go to `fetcher` directly.
    pub fn with_fetcher(config: ExtractorConfig, fetcher: F) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ScrapeError::ScrapeFailed(e.to_string()))?;
        let fetcher = RetryFetch::new(fetcher, config.max_attempts, config.base_delay())
            .with_policy(config.retry_policy());
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the article at `url`.
    ///
    /// Input is cleaned first (see [`normalize_url`]); malformed input fails
    /// with `InvalidUrl` before any request is made. When
    /// `overall_timeout_secs` is set the whole operation, backoff sleeps
    /// included, is bounded by it and fails with `FetchTimeout`.
    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, url: &str) -> Result<ScrapeResult> {
        let t0 = Instant::now();
        let result = match self.config.overall_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.run(url))
                .await
                .unwrap_or_else(|_| {
                    warn!(?limit, "Extraction exceeded overall timeout");
                    Err(ScrapeError::FetchTimeout)
                }),
            None => self.run(url).await,
        };

        match &result {
            Ok(article) => info!(
                title = %article.title,
                minutes = article.estimated_read_time_minutes,
                chars = article.content.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Extraction complete"
            ),
            Err(e) => warn!(
                error = %e,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Extraction failed"
            ),
        }
        result
    }

    /// Like [`extract`](Self::extract), abandoned with `Cancelled` as soon as
    /// `signal` completes.
    #[instrument(level = "debug", skip(self, signal))]
    pub async fn extract_with_cancel<S>(&self, url: &str, signal: S) -> Result<ScrapeResult>
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            result = self.extract(url) => result,
            () = signal => {
                warn!("Extraction cancelled");
                Err(ScrapeError::Cancelled)
            }
        }
    }

    async fn run(&self, input: &str) -> Result<ScrapeResult> {
        let url = normalize_url(input).map_err(ScrapeError::InvalidUrl)?;

        if self.config.substack_enabled {
            if let ArticleSource::Substack { publication, slug } = ArticleSource::from_url(&url) {
                match self.via_substack(&publication, &slug, &url).await {
                    Ok(result) => return Ok(result),
                    Err(e) => warn!(error = %e, "Substack API unavailable; falling back to HTML"),
                }
            }
        }

        let request = FetchRequest::page(url, &self.config);
        let page = self.fetcher.fetch(&request).await?;
        if let Some(content_type) = page.content_type.as_deref() {
            if !content_type.contains("html") {
                debug!(content_type, "Response is not declared as HTML; parsing anyway");
            }
        }
        extract_from_html(&page.body, &page.url, self.config.words_per_minute)
    }

    async fn via_substack(&self, publication: &str, slug: &str, url: &Url) -> Result<ScrapeResult> {
        let api_base = substack::api_base(publication)?;
        // One try per endpoint; backoff applies to the HTML fetch only.
        substack::fetch_post(self.fetcher.inner(), &api_base, slug, url, &self.config).await
    }
}
