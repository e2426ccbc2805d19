//! HTML subtree to structured plain text.
//!
//! Only a small set of tags keeps its meaning: `p`, `h1`..`h6`, `ol`, `ul`,
//! `li`, `blockquote`, `img` and `a`. Everything else is unwrapped, so its
//! text survives without its semantics. Output conventions:
//!
//! ```text
//! Paragraph or heading text            (followed by a blank line)
//! • list item                          (followed by one newline)
//! link text (https://example.com/href) (inline inside its block)
//! ```
//!
//! Two consecutive `<br>` end a paragraph, a single one is a line break, and a
//! `div` that holds nothing but text (or text and one `<br>`) is a paragraph.

use crate::page::{content_text, is_inline, is_non_content};
use scraper::{ElementRef, Html, Node};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKind {
    /// Text outside any paragraph-like element.
    Loose,
    Paragraph,
    ListItem,
}

/// Text accumulated for the innermost open block.
#[derive(Debug)]
struct Run {
    kind: RunKind,
    text: String,
    pending_space: bool,
    after_break: bool,
    links: usize,
    has_plain_text: bool,
}

impl Run {
    fn new(kind: RunKind) -> Self {
        Self {
            kind,
            text: String::new(),
            pending_space: false,
            after_break: false,
            links: 0,
            has_plain_text: false,
        }
    }

    fn push_text(&mut self, raw: &str) {
        for ch in raw.chars() {
            if ch.is_whitespace() {
                if !self.text.is_empty() && !self.text.ends_with('\n') {
                    self.pending_space = true;
                }
                continue;
            }
            if self.pending_space {
                self.text.push(' ');
                self.pending_space = false;
            }
            self.text.push(ch);
            self.after_break = false;
        }
    }

    /// Start a new line within the run.
    fn soft_break(&mut self) {
        self.pending_space = false;
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.after_break = true;
    }

    /// Take the accumulated text and reset the run for reuse.
    fn take(&mut self) -> (String, bool) {
        let lone_link = self.links == 1 && !self.has_plain_text;
        let text = std::mem::take(&mut self.text)
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n");
        self.pending_space = false;
        self.after_break = false;
        self.links = 0;
        self.has_plain_text = false;
        (text.trim().to_string(), lone_link)
    }
}

struct Writer<'a> {
    out: String,
    base: Option<&'a Url>,
    loose: Run,
    open: Vec<Run>,
    after_list_item: bool,
}

impl<'a> Writer<'a> {
    fn new(base: Option<&'a Url>) -> Self {
        Self {
            out: String::new(),
            base,
            loose: Run::new(RunKind::Loose),
            open: Vec::new(),
            after_list_item: false,
        }
    }

    fn top(&mut self) -> &mut Run {
        match self.open.last_mut() {
            Some(run) => run,
            None => &mut self.loose,
        }
    }

    fn emit(&mut self, kind: RunKind, text: &str, lone_link: bool) {
        if text.is_empty() {
            return;
        }
        let was_list_item = std::mem::replace(&mut self.after_list_item, kind == RunKind::ListItem);
        match kind {
            RunKind::ListItem => {
                self.out.push_str("• ");
                self.out.push_str(text);
                self.out.push('\n');
            }
            RunKind::Loose if lone_link => {
                if was_list_item {
                    self.out.push('\n');
                }
                self.out.push_str(text);
                self.out.push('\n');
            }
            RunKind::Loose | RunKind::Paragraph => {
                // Keep a blank line between a list and the paragraph after it.
                if was_list_item {
                    self.out.push('\n');
                }
                self.out.push_str(text);
                self.out.push_str("\n\n");
            }
        }
    }

    /// End the text run of the innermost open block.
    fn boundary(&mut self) {
        let run = self.top();
        let kind = run.kind;
        let (text, lone_link) = run.take();
        self.emit(kind, &text, lone_link);
    }

    fn text(&mut self, raw: &str) {
        let run = self.top();
        if !raw.trim().is_empty() {
            run.has_plain_text = true;
        }
        run.push_text(raw);
    }

    fn line_break(&mut self) {
        let run = self.top();
        // A list item stays one bullet however many breaks it holds.
        if run.after_break && run.kind != RunKind::ListItem {
            self.boundary();
            return;
        }
        run.soft_break();
    }

    fn block(&mut self, element: ElementRef<'_>, kind: RunKind) {
        // Paragraphs inside a list item are lines of that item.
        if kind == RunKind::Paragraph && self.open.last().is_some_and(|run| run.kind == RunKind::ListItem) {
            self.top().soft_break();
            self.walk(element);
            self.top().soft_break();
            return;
        }
        self.boundary();
        self.open.push(Run::new(kind));
        self.walk(element);
        if let Some(mut run) = self.open.pop() {
            let (text, lone_link) = run.take();
            self.emit(kind, &text, lone_link);
        }
    }

    fn link(&mut self, element: ElementRef<'_>) {
        let label = content_text(element);
        if label.is_empty() {
            return;
        }
        let href = element.value().attr("href").and_then(|href| self.resolve(href));
        let run = self.top();
        match href {
            Some(href) => {
                run.push_text(&format!("{label} ({href})"));
                run.links += 1;
            }
            None => {
                run.push_text(&label);
                run.has_plain_text = true;
            }
        }
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:") {
            return None;
        }
        match self.base.map(|base| base.join(href)) {
            Some(Ok(url)) => Some(url.to_string()),
            _ => Some(href.to_string()),
        }
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        if !is_non_content(&child) {
                            self.element(child);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        match name {
            "br" => self.line_break(),
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.block(element, RunKind::Paragraph),
            "li" => self.block(element, RunKind::ListItem),
            "div" if is_bare_div(element) => self.block(element, RunKind::Paragraph),
            "a" => self.link(element),
            "img" => {}
            _ if is_inline(name) => self.walk(element),
            // ul, ol, blockquote and every unwrapped block-level tag
            _ => {
                self.boundary();
                self.walk(element);
                self.boundary();
            }
        }
    }

    fn finish(mut self) -> String {
        self.boundary();
        self.out.trim().to_string()
    }
}

/// A `div` with no element children, or only a single `<br>`.
fn is_bare_div(element: ElementRef<'_>) -> bool {
    let mut children = element.children().filter_map(ElementRef::wrap);
    match (children.next(), children.next()) {
        (None, _) => true,
        (Some(only), None) => only.value().name() == "br",
        _ => false,
    }
}

/// Serialize `root` and its content descendants to structured text.
///
/// `root` itself is never rejected as non-content; callers choose it.
pub fn format_content(root: ElementRef<'_>, base: Option<&Url>) -> String {
    let mut writer = Writer::new(base);
    writer.walk(root);
    writer.finish()
}

/// Serialize an HTML fragment, e.g. an API-provided article body.
pub fn format_fragment(html: &str, base: Option<&Url>) -> String {
    let fragment = Html::parse_fragment(html);
    format_content(fragment.root_element(), base)
}
