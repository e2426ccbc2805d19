//! Substack posts through the publication's JSON API.
//!
//! Substack renders post bodies client-side behind a paywall-aware shell, so
//! the HTML of `/p/<slug>` is often a teaser. The API exposes the full
//! `body_html` for public posts. Three endpoint shapes exist in the wild:
//!
//! ```text
//! /api/v1/posts/{slug}          -> { "title": .., "body_html": .. }
//! /api/v1/archive/{slug}        -> [ { "slug": .., .. }, .. ]
//! /api/v1/public/posts/{slug}   -> { "post": { .. } }
//! ```
//!
//! They are probed in that order and the first one returning a recognizable
//! post wins.

use crate::config::ExtractorConfig;
use crate::content::format_fragment;
use crate::error::{Result, ScrapeError};
use crate::fetch::{FetchPage, FetchRequest};
use crate::models::{ScrapeResult, UNTITLED};
use crate::reading::{estimate_read_time, word_count};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const API_PATHS: &[&str] = &[
    "api/v1/posts/",
    "api/v1/archive/",
    "api/v1/public/posts/",
];

#[derive(Debug, Default, Deserialize)]
struct Byline {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Post {
    title: Option<String>,
    subtitle: Option<String>,
    body_html: Option<String>,
    body: Option<String>,
    cover_image: Option<String>,
    author: Option<Byline>,
    #[serde(rename = "publishedBylines")]
    published_bylines: Option<Vec<Byline>>,
    published_at: Option<String>,
    post_date: Option<String>,
}

/// Base URL of a publication's API, e.g. `https://example.substack.com/`.
pub fn api_base(publication: &str) -> Result<Url> {
    Url::parse(&format!("https://{publication}.substack.com/"))
        .map_err(|e| ScrapeError::InvalidUrl(e.to_string()))
}

fn is_post_object(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| ["title", "body_html", "body"].iter().any(|key| object.contains_key(*key)))
}

/// Locate the post inside whatever shape the endpoint answered with.
fn find_post(value: Value, slug: &str) -> Option<Value> {
    match value {
        Value::Object(mut object) => match object.remove("post") {
            Some(inner) if is_post_object(&inner) => Some(inner),
            _ => {
                let value = Value::Object(object);
                is_post_object(&value).then_some(value)
            }
        },
        Value::Array(items) => items
            .into_iter()
            .find(|item| is_post_object(item) && item.get("slug").and_then(Value::as_str) == Some(slug)),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Turn an API post object into a result.
///
/// # Arguments
/// * `post` - The post object located by [`find_post`]
/// * `page_url` - The post's public URL, used to resolve relative links
/// * `words_per_minute` - Reading speed for the estimate
///
/// # Returns
/// * `Err(ScrapeError::InvalidApiResponse)` when the post has no body at all
fn build_result(post: Value, page_url: &Url, words_per_minute: usize) -> Result<ScrapeResult> {
    let post: Post = serde_json::from_value(post).map_err(|e| ScrapeError::InvalidApiResponse(e.to_string()))?;

    let Some(body) = post.body_html.or(post.body) else {
        return Err(ScrapeError::InvalidApiResponse(
            "post has neither body_html nor body".to_string(),
        ));
    };
    let content = format_fragment(&body, Some(page_url));
    if content.is_empty() {
        return Err(ScrapeError::NoContentFound);
    }

    let author = post
        .author
        .and_then(|byline| non_empty(byline.name))
        .or_else(|| {
            post.published_bylines
                .unwrap_or_default()
                .into_iter()
                .next()
                .and_then(|byline| non_empty(byline.name))
        });

    Ok(ScrapeResult {
        title: non_empty(post.title).unwrap_or_else(|| UNTITLED.to_string()),
        estimated_read_time_minutes: estimate_read_time(word_count(&content), words_per_minute),
        content,
        description: non_empty(post.subtitle),
        image_url: non_empty(post.cover_image).map(|image| match page_url.join(&image) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => image,
        }),
        author,
        publish_date: non_empty(post.published_at).or_else(|| non_empty(post.post_date)),
    })
}

/// Probe the API endpoints for `slug` and build a result from the first post
/// found.
///
/// Fetch failures and unrecognizable payloads move on to the next endpoint.
/// A recognized post without a body fails with `InvalidApiResponse` rather
/// than trying further endpoints.
#[instrument(level = "info", skip(fetcher, api_base, page_url, config), fields(api = %api_base))]
pub async fn fetch_post<F>(
    fetcher: &F,
    api_base: &Url,
    slug: &str,
    page_url: &Url,
    config: &ExtractorConfig,
) -> Result<ScrapeResult>
where
    F: FetchPage,
{
    let encoded = urlencoding::encode(slug);
    for path in API_PATHS {
        let endpoint = match api_base.join(&format!("{path}{encoded}")) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(path, error = %e, "Skipping unbuildable API endpoint");
                continue;
            }
        };

        let request = FetchRequest::json(endpoint, page_url, config);
        let page = match fetcher.fetch(&request).await {
            Ok(page) => page,
            Err(e) => {
                debug!(path, error = %e, "API endpoint failed");
                continue;
            }
        };

        let Ok(value) = serde_json::from_str::<Value>(&page.body) else {
            debug!(path, bytes = page.body.len(), "API endpoint returned non-JSON");
            continue;
        };
        let Some(post) = find_post(value, slug) else {
            debug!(path, "No post object in API response");
            continue;
        };

        info!(path, "Substack post found via API");
        return build_result(post, page_url, config.words_per_minute);
    }

    Err(ScrapeError::InvalidApiResponse(
        "no API endpoint returned a post".to_string(),
    ))
}
