//! Data models produced and consumed by the extractor.
//!
//! - [`ScrapeResult`]: the outcome of one extraction
//! - [`NewContent`]: what the persistence collaborator accepts
//! - [`SavedContent`]: what it hands back once stored

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a page exposes none.
pub const UNTITLED: &str = "Untitled";

/// A readable article extracted from a URL.
///
/// `content` is plain text: paragraphs separated by a blank line, list items
/// prefixed with `"• "`, links rendered as `"text (href)"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    pub estimated_read_time_minutes: u32,
    pub image_url: Option<String>,
    pub author: Option<String>,
    /// Whatever the source exposed; not re-validated.
    pub publish_date: Option<String>,
}

/// A record to persist, attributed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewContent {
    pub title: String,
    pub content: String,
    pub url: String,
    pub estimated_read_time: u32,
    pub description: Option<String>,
    pub user_id: String,
}

impl NewContent {
    pub fn from_result(result: &ScrapeResult, url: &str, user_id: &str) -> Self {
        Self {
            title: result.title.clone(),
            content: result.content.clone(),
            url: url.to_string(),
            estimated_read_time: result.estimated_read_time_minutes,
            description: result.description.clone(),
            user_id: user_id.to_string(),
        }
    }
}

/// A stored record with its generated identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SavedContent {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub content: NewContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScrapeResult {
        ScrapeResult {
            title: "A Title".to_string(),
            content: "Body text".to_string(),
            description: Some("Summary".to_string()),
            estimated_read_time_minutes: 2,
            image_url: None,
            author: Some("Jane Doe".to_string()),
            publish_date: Some("2024-03-01".to_string()),
        }
    }

    #[test]
    fn test_scrape_result_uses_camel_case() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"estimatedReadTimeMinutes\":2"));
        assert!(json.contains("\"imageUrl\":null"));
        assert!(json.contains("\"publishDate\":\"2024-03-01\""));
    }

    #[test]
    fn test_new_content_from_result() {
        let record = NewContent::from_result(&sample(), "https://example.com/a", "user-1");
        assert_eq!(record.title, "A Title");
        assert_eq!(record.estimated_read_time, 2);
        assert_eq!(record.description.as_deref(), Some("Summary"));
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.url, "https://example.com/a");
    }

    #[test]
    fn test_saved_content_flattens_record() {
        let saved = SavedContent {
            id: "abc".to_string(),
            created_at: Utc::now(),
            content: NewContent::from_result(&sample(), "https://example.com/a", "user-1"),
        };
        let value = serde_json::to_value(&saved).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["title"], "A Title");
        assert_eq!(value["user_id"], "user-1");

        let back: SavedContent = serde_json::from_value(value).unwrap();
        assert_eq!(back, saved);
    }
}
