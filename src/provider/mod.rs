//! Choosing between the generic HTML path and a provider's API.

pub mod substack;

use url::Url;

const SUBSTACK_SUFFIX: &str = ".substack.com";

/// Where the article body of a URL should come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleSource {
    /// Fetch the page and run the HTML extractor.
    Generic,
    /// A Substack post, readable through the publication's JSON API.
    Substack { publication: String, slug: String },
}

impl ArticleSource {
    pub fn from_url(url: &Url) -> Self {
        substack_post(url)
            .map(|(publication, slug)| ArticleSource::Substack { publication, slug })
            .unwrap_or(ArticleSource::Generic)
    }
}

/// `https://<publication>.substack.com/p/<slug>` -> (publication, slug)
fn substack_post(url: &Url) -> Option<(String, String)> {
    let host = url.host_str()?.to_ascii_lowercase();
    let publication = host.strip_suffix(SUBSTACK_SUFFIX)?;
    if publication.is_empty() || publication.contains('.') || publication == "www" {
        return None;
    }

    let mut segments = url.path_segments()?;
    let raw_slug = loop {
        match segments.next()? {
            "p" => break segments.next()?,
            _ => continue,
        }
    };
    let slug = urlencoding::decode(raw_slug).ok()?.trim().to_string();
    if slug.is_empty() {
        return None;
    }
    Some((publication.to_string(), slug))
}
