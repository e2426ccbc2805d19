//! # focus_extract
//!
//! Readable article extraction: given an article URL, fetch it and produce a
//! clean plain-text body together with title, description, author, publish
//! date, hero image and an estimated reading time.
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run() -> focus_extract::Result<()> {
//! let article = focus_extract::extract("example.com/posts/hello").await?;
//! println!("{} ({} min)", article.title, article.estimated_read_time_minutes);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`fetch`]): URL cleanup, browser-like GET, 403
//!    User-Agent swap, exponential backoff
//! 2. **Provider routing** ([`provider`]): Substack posts go through the JSON
//!    API, everything else (and any API failure) through the HTML path
//! 3. **Parsing** ([`page`]): one `scraper` tree per page, non-content nodes
//!    skipped rather than removed
//! 4. **Metadata** ([`metadata`]) and **content** ([`content`]): ranked
//!    fallback chains over the same tree
//! 5. **Estimation** ([`reading`]): word count to minutes

pub mod config;
pub mod content;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod metadata;
pub mod models;
pub mod outputs;
pub mod page;
pub mod provider;
pub mod reading;
pub mod utils;

pub use config::ExtractorConfig;
pub use error::{FetchError, Result, ScrapeError};
pub use extract::{Extractor, extract_from_html};
pub use models::{NewContent, SavedContent, ScrapeResult};
pub use reading::sanitize_content;

/// Extract `url` with the default configuration.
pub async fn extract(url: &str) -> Result<ScrapeResult> {
    Extractor::new(ExtractorConfig::default())?.extract(url).await
}
