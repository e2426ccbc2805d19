//! Best-effort page metadata.
//!
//! Each field is a ranked chain of probes declared as data. A probe is a CSS
//! selector plus where to read the value from; the first probe yielding a
//! non-empty, whitespace-collapsed value wins. A chain that finds nothing
//! yields `None`; no lookup here can fail an extraction.

use crate::page::{Page, collapse_whitespace, content_text};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

/// Where a probe reads its value from.
#[derive(Debug, Clone, Copy)]
pub enum Read {
    /// A single attribute.
    Attr(&'static str),
    /// The element's visible text.
    Text,
    /// The attribute when present and non-empty, otherwise the text.
    AttrOrText(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub css: &'static str,
    pub read: Read,
}

const fn meta(css: &'static str) -> Probe {
    Probe {
        css,
        read: Read::Attr("content"),
    }
}

const fn text(css: &'static str) -> Probe {
    Probe {
        css,
        read: Read::Text,
    }
}

pub const TITLE_PROBES: &[Probe] = &[
    meta(r#"meta[property="og:title"]"#),
    meta(r#"meta[name="twitter:title"]"#),
    meta(r#"meta[property="twitter:title"]"#),
    text("h1.post-title"),
    text("h1.entry-title"),
    text("h1.article-title"),
    text("h1.headline"),
    text(".post-title"),
    text(".entry-title"),
    text(".article-title"),
    text("h1"),
    text("title"),
];

pub const DESCRIPTION_PROBES: &[Probe] = &[
    meta(r#"meta[property="og:description"]"#),
    meta(r#"meta[name="twitter:description"]"#),
    meta(r#"meta[property="twitter:description"]"#),
    meta(r#"meta[name="description"]"#),
    meta(r#"meta[itemprop="description"]"#),
];

pub const AUTHOR_PROBES: &[Probe] = &[
    meta(r#"meta[property="article:author"]"#),
    meta(r#"meta[name="author"]"#),
    text(".author-name"),
    text(".byline-name"),
    text(".post-author"),
    text(".entry-author"),
    text(".article-author"),
    text(".byline .author"),
    text(".author"),
    text(r#"[rel="author"]"#),
    Probe {
        css: r#"[itemprop="author"]"#,
        read: Read::AttrOrText("content"),
    },
    // Substack and Medium bylines.
    text(".byline-names"),
    text(r#"[data-testid="authorName"]"#),
];

pub const PUBLISH_DATE_PROBES: &[Probe] = &[
    meta(r#"meta[property="article:published_time"]"#),
    meta(r#"meta[name="publication_date"]"#),
    Probe {
        css: "time[datetime]",
        read: Read::Attr("datetime"),
    },
    text("time"),
    Probe {
        css: r#"[itemprop="datePublished"][datetime]"#,
        read: Read::Attr("datetime"),
    },
    Probe {
        css: r#"[itemprop="datePublished"]"#,
        read: Read::AttrOrText("content"),
    },
    text(".published"),
    text(".publish-date"),
    text(".post-date"),
    text(".entry-date"),
    text(".article-date"),
    text(".date"),
    text(".byline-date"),
    text(r#"[data-testid="storyPublishDate"]"#),
];

pub const IMAGE_PROBES: &[Probe] = &[
    meta(r#"meta[property="og:image"]"#),
    meta(r#"meta[name="twitter:image"]"#),
    meta(r#"meta[property="twitter:image"]"#),
    meta(r#"meta[itemprop="image"]"#),
    Probe {
        css: r#"img[itemprop="image"]"#,
        read: Read::Attr("src"),
    },
    Probe {
        css: ".available-content img[src]",
        read: Read::Attr("src"),
    },
    Probe {
        css: ".post-content img[src]",
        read: Read::Attr("src"),
    },
    Probe {
        css: ".entry-content img[src]",
        read: Read::Attr("src"),
    },
    Probe {
        css: ".article-content img[src]",
        read: Read::Attr("src"),
    },
    Probe {
        css: "article img[src]",
        read: Read::Attr("src"),
    },
    Probe {
        css: "main img[src]",
        read: Read::Attr("src"),
    },
];

/// A probe with its selector parsed.
pub struct CompiledProbe {
    selector: Selector,
    read: Read,
}

pub fn compile(probes: &[Probe]) -> Vec<CompiledProbe> {
    probes
        .iter()
        .filter_map(|probe| {
            Selector::parse(probe.css).ok().map(|selector| CompiledProbe {
                selector,
                read: probe.read,
            })
        })
        .collect()
}

static TITLE: Lazy<Vec<CompiledProbe>> = Lazy::new(|| compile(TITLE_PROBES));
static DESCRIPTION: Lazy<Vec<CompiledProbe>> = Lazy::new(|| compile(DESCRIPTION_PROBES));
static AUTHOR: Lazy<Vec<CompiledProbe>> = Lazy::new(|| compile(AUTHOR_PROBES));
static PUBLISH_DATE: Lazy<Vec<CompiledProbe>> = Lazy::new(|| compile(PUBLISH_DATE_PROBES));
static IMAGE: Lazy<Vec<CompiledProbe>> = Lazy::new(|| compile(IMAGE_PROBES));

fn read_value(element: ElementRef<'_>, read: Read) -> Option<String> {
    let value = match read {
        Read::Attr(name) => collapse_whitespace(element.value().attr(name)?),
        Read::Text => content_text(element),
        Read::AttrOrText(name) => match element.value().attr(name).map(collapse_whitespace) {
            Some(value) if !value.is_empty() => value,
            _ => content_text(element),
        },
    };
    (!value.is_empty()).then_some(value)
}

/// Evaluate a chain: every element of every probe, in order, until one
/// yields a value.
pub fn first_match(page: &Page, chain: &[CompiledProbe]) -> Option<String> {
    chain.iter().find_map(|probe| {
        page.html()
            .select(&probe.selector)
            .find_map(|element| read_value(element, probe.read))
    })
}

/// Metadata gathered from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    /// Absolute when resolvable against the page URL.
    pub image_url: Option<String>,
}

pub fn title(page: &Page) -> Option<String> {
    first_match(page, &TITLE)
}

pub fn description(page: &Page) -> Option<String> {
    first_match(page, &DESCRIPTION)
}

pub fn author(page: &Page) -> Option<String> {
    first_match(page, &AUTHOR)
}

pub fn publish_date(page: &Page) -> Option<String> {
    first_match(page, &PUBLISH_DATE)
}

pub fn image_url(page: &Page) -> Option<String> {
    first_match(page, &IMAGE).map(|raw| page.resolve(&raw))
}

pub fn extract_metadata(page: &Page) -> Metadata {
    Metadata {
        title: title(page),
        description: description(page),
        author: author(page),
        publish_date: publish_date(page),
        image_url: image_url(page),
    }
}
