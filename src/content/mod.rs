//! Locating the article body.
//!
//! Candidates are tried in a fixed order and the first one that serializes to
//! non-empty text wins:
//!
//! 1. ranked container selectors (newsletter platform bodies, `article`,
//!    `[role=main]`, then generic `content`/`post`/`article` classes)
//! 2. the first `<article>`
//! 3. the first `<main>`
//! 4. the whole `<body>` as unstructured text
//!
//! The last path loses all paragraph structure and exists so that a page with
//! text never fails only because it lacks semantic containers.

pub mod format;

pub use format::{format_content, format_fragment};

use crate::error::{Result, ScrapeError};
use crate::page::{Page, content_text, is_non_content_tag};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use tracing::debug;

pub const CONTAINER_SELECTORS: &[&str] = &[
    // Substack post bodies
    ".available-content .body.markup",
    ".available-content",
    ".body.markup",
    "article",
    r#"[role="main"]"#,
    r#"[role="article"]"#,
    ".post-content",
    ".article-content",
    ".article-body",
    ".entry-content",
    ".story-body",
    ".post-body",
    ".content",
    ".post",
    ".article",
    "#content",
];

static CONTAINERS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    CONTAINER_SELECTORS
        .iter()
        .filter_map(|css| Selector::parse(css).ok().map(|selector| (*css, selector)))
        .collect()
});

static ARTICLE: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("article").ok());
static MAIN: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("main").ok());
static BODY: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("body").ok());

/// Which fallback produced the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Container(&'static str),
    Article,
    Main,
    /// Tag-stripped body text without structure.
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub source: ContentSource,
}

/// Whether the element or one of its ancestors is chrome by tag (`header`,
/// `footer`, `nav`, `aside`, ...). Class hints only prune descendants of a
/// chosen candidate; they never veto the candidate itself.
fn inside_non_content(element: ElementRef<'_>) -> bool {
    is_non_content_tag(&element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_non_content_tag(&ancestor))
}

fn serialize(page: &Page, element: ElementRef<'_>) -> Option<String> {
    let text = format_content(element, Some(page.url()));
    (!text.is_empty()).then_some(text)
}

/// First match of `selector` that does not sit inside page chrome.
fn first_content_element<'a>(page: &'a Page, selector: &Selector) -> Option<ElementRef<'a>> {
    page.html()
        .select(selector)
        .find(|element| !inside_non_content(*element))
}

fn first_of(page: &Page, selector: &Option<Selector>) -> Option<String> {
    let element = first_content_element(page, selector.as_ref()?)?;
    serialize(page, element)
}

/// Run the candidate chain over a parsed page.
pub fn extract_content(page: &Page) -> Result<ExtractedContent> {
    for (css, selector) in CONTAINERS.iter() {
        let Some(element) = first_content_element(page, selector) else {
            continue;
        };
        if let Some(text) = serialize(page, element) {
            debug!(selector = css, chars = text.len(), "Content container matched");
            return Ok(ExtractedContent {
                text,
                source: ContentSource::Container(css),
            });
        }
    }

    if let Some(text) = first_of(page, &ARTICLE) {
        return Ok(ExtractedContent {
            text,
            source: ContentSource::Article,
        });
    }

    if let Some(text) = first_of(page, &MAIN) {
        return Ok(ExtractedContent {
            text,
            source: ContentSource::Main,
        });
    }

    let body_text = BODY
        .as_ref()
        .and_then(|selector| page.first(selector))
        .map(content_text)
        .unwrap_or_default();
    if body_text.is_empty() {
        return Err(ScrapeError::NoContentFound);
    }
    debug!(chars = body_text.len(), "Falling back to raw body text");
    Ok(ExtractedContent {
        text: body_text,
        source: ContentSource::Body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(html: &str) -> Page {
        Page::parse(html, Url::parse("https://site.com/a/b").unwrap())
    }

    #[test]
    fn test_every_container_selector_parses() {
        assert_eq!(CONTAINERS.len(), CONTAINER_SELECTORS.len());
    }

    #[test]
    fn test_article_text_without_scripts_or_tags() {
        let page = page(
            r#"<html><body><nav>Home | About</nav>
               <article><h1>Title</h1><p>First <b>bold</b> words.</p>
               <script>var x = "<p>hidden</p>";</script><style>.a{}</style>
               <p>Second paragraph.</p></article>
               <footer>(c) 2024</footer></body></html>"#,
        );
        let content = extract_content(&page).unwrap();
        assert_eq!(content.source, ContentSource::Container("article"));
        assert_eq!(content.text, "Title\n\nFirst bold words.\n\nSecond paragraph.");
        assert!(!content.text.contains('<'));
        assert!(!content.text.contains("hidden"));
        assert!(!content.text.contains("Home"));
    }

    #[test]
    fn test_platform_container_ranks_first() {
        let page = page(
            r#"<body><article><p>Teaser</p>
               <div class="available-content"><div class="body markup"><p>Full post</p></div></div>
               </article></body>"#,
        );
        let content = extract_content(&page).unwrap();
        assert_eq!(content.source, ContentSource::Container(".available-content .body.markup"));
        assert_eq!(content.text, "Full post");
    }

    #[test]
    fn test_empty_container_falls_through() {
        let page = page(
            r#"<body><article><script>only()</script></article>
               <div class="entry-content"><p>Real text</p></div></body>"#,
        );
        let content = extract_content(&page).unwrap();
        assert_eq!(content.source, ContentSource::Container(".entry-content"));
        assert_eq!(content.text, "Real text");
    }

    #[test]
    fn test_container_inside_chrome_is_ignored() {
        let page = page(
            r#"<body><footer><div class="content"><p>Legal</p></div></footer>
               <main><p>Main story</p></main></body>"#,
        );
        let content = extract_content(&page).unwrap();
        assert_eq!(content.source, ContentSource::Main);
        assert_eq!(content.text, "Main story");
    }

    #[test]
    fn test_chrome_like_wrapper_class_does_not_hide_article() {
        let sidebar = page(
            r#"<body><div class="layout-with-sidebar"><article><p>Hello world story.</p></article></div></body>"#,
        );
        let content = extract_content(&sidebar).unwrap();
        assert_eq!(content.source, ContentSource::Container("article"));
        assert_eq!(content.text, "Hello world story.");

        // "thread-view" contains the "ad-" hint.
        let thread = page(r#"<body><main class="thread-view"><article><p>Story body.</p></article></main></body>"#);
        assert_eq!(extract_content(&thread).unwrap().text, "Story body.");
    }

    #[test]
    fn test_candidate_with_hint_class_is_still_used() {
        let page = page(r#"<body><div class="entry-content has-header"><p>Kept text</p></div></body>"#);
        let content = extract_content(&page).unwrap();
        assert_eq!(content.source, ContentSource::Container(".entry-content"));
        assert_eq!(content.text, "Kept text");
    }

    #[test]
    fn test_body_fallback_is_unstructured() {
        let page = page(
            "<html><body><div><span>Just</span>\n<span>some</span></div><div><span>loose text</span></div>\
             <script>x()</script></body></html>",
        );
        let content = extract_content(&page).unwrap();
        assert_eq!(content.source, ContentSource::Body);
        assert_eq!(content.text, "Just some loose text");
    }

    #[test]
    fn test_body_class_does_not_hide_page() {
        let page = page(r#"<html><body class="has-sidebar"><div><span>Text</span></div></body></html>"#);
        assert_eq!(extract_content(&page).unwrap().text, "Text");
    }

    #[test]
    fn test_only_chrome_is_no_content() {
        let page = page(
            r#"<html><body><header>Logo</header><nav>Links</nav>
               <div class="sidebar">Popular</div><footer>Bye</footer>
               <script>track()</script></body></html>"#,
        );
        assert_eq!(extract_content(&page).unwrap_err(), ScrapeError::NoContentFound);
    }
}
