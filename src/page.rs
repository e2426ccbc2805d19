//! Parsed page model and the non-content predicate.
//!
//! The tree itself is never mutated. Stripping happens by skipping: every
//! consumer that walks a subtree asks [`is_non_content`] and does not descend
//! into elements it rejects.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Tags that never hold article text.
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "iframe", "noscript",
];

/// Class substrings that mark chrome, ads and discussion threads.
const NON_CONTENT_CLASS_HINTS: &[&str] = &[
    "nav",
    "menu",
    "header",
    "footer",
    "comment",
    "sidebar",
    "widget",
    "banner",
    "ad-",
    "advertisement",
];

/// Phrasing elements that continue the surrounding text run.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "font", "i",
    "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strike", "strong", "sub",
    "sup", "time", "tt", "u", "var", "wbr",
];

/// A fetched HTML document together with the URL it was served from.
pub struct Page {
    html: Html,
    url: Url,
}

impl Page {
    pub fn parse(html: &str, url: Url) -> Self {
        Self {
            html: Html::parse_document(html),
            url,
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// First element matching `selector`, if any.
    pub fn first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// Resolve a possibly relative reference against the page URL, keeping
    /// the raw string when it cannot be resolved.
    pub fn resolve(&self, reference: &str) -> String {
        let reference = reference.trim();
        match self.url.join(reference) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => reference.to_string(),
        }
    }
}

/// Whether the element's tag alone marks it as chrome or code.
pub fn is_non_content_tag(element: &ElementRef<'_>) -> bool {
    NON_CONTENT_TAGS.contains(&element.value().name())
}

/// Whether an element should be dropped along with its whole subtree.
pub fn is_non_content(element: &ElementRef<'_>) -> bool {
    if is_non_content_tag(element) {
        return true;
    }
    element
        .value()
        .attr("class").is_some_and(|class| {
        let class = class.to_ascii_lowercase();
        NON_CONTENT_CLASS_HINTS.iter().any(|hint| class.contains(hint))
    })
}

pub fn is_inline(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of `element`, skipping non-content descendants, whitespace collapsed.
///
/// The element itself is not tested against [`is_non_content`].
pub fn content_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_content_text(element, &mut raw);
    collapse_whitespace(&raw)
}

fn push_content_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if is_non_content(&child) {
                        continue;
                    }
                    let block = !is_inline(child.value().name());
                    if block {
                        out.push(' ');
                    }
                    push_content_text(child, out);
                    if block {
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}
