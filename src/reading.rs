//! Reading-time estimation and caller-side text cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUNS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r" {2,}").ok());
static SPACES_AROUND_NEWLINE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r" *\n *").ok());
static BLANK_LINE_RUNS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\n{3,}").ok());

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes needed to read `words` at `words_per_minute`, rounded up, never
/// less than one.
pub fn estimate_read_time(words: usize, words_per_minute: usize) -> u32 {
    let minutes = words.div_ceil(words_per_minute.max(1)).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

fn replace_all(pattern: &Lazy<Option<Regex>>, text: String, with: &str) -> String {
    match pattern.as_ref() {
        Some(re) => re.replace_all(&text, with).into_owned(),
        None => text,
    }
}

/// Reduce extracted text to printable ASCII before it is stored.
///
/// Tabs and carriage returns become spaces, then every character outside
/// `0x20..=0x7E` except `\n` is dropped (the `•` list marker included).
/// Space runs collapse, spaces around line breaks go, and at most one blank
/// line is kept between paragraphs.
pub fn sanitize_content(content: &str) -> String {
    let printable: String = content
        .chars()
        .map(|c| if matches!(c, '\t' | '\r') { ' ' } else { c })
        .filter(|c| *c == '\n' || (' '..='~').contains(c))
        .collect();
    let text = replace_all(&SPACE_RUNS, printable, " ");
    let text = replace_all(&SPACES_AROUND_NEWLINE, text, "\n");
    let text = replace_all(&BLANK_LINE_RUNS, text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("  one\ttwo\n\nthree  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_read_time_rounds_up() {
        assert_eq!(estimate_read_time(word_count(&words(100)), 200), 1);
        assert_eq!(estimate_read_time(word_count(&words(450)), 200), 3);
        assert_eq!(estimate_read_time(400, 200), 2);
        assert_eq!(estimate_read_time(401, 200), 3);
    }

    #[test]
    fn test_read_time_minimum_is_one() {
        assert_eq!(estimate_read_time(0, 200), 1);
        assert_eq!(estimate_read_time(1, 200), 1);
        assert_eq!(estimate_read_time(10, 0), 10);
    }

    #[test]
    fn test_sanitize_strips_non_printable() {
        assert_eq!(sanitize_content("caf\u{e9} \u{7}bell\u{200b}"), "caf bell");
        assert_eq!(sanitize_content("• item one\n• item two"), "item one\nitem two");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_content("a    b\t\tc"), "a b c");
        assert_eq!(sanitize_content("  para one  \n\n\n\n  para two \n"), "para one\n\npara two");
        assert_eq!(sanitize_content("line\r\nnext"), "line\nnext");
    }
}
