//! Small helpers shared by the library and the binary.

use std::borrow::Cow;

/// Shorten `s` to `max_chars` characters for a log field.
///
/// Anything cut off is summarized as a count so log lines stay bounded even
/// for whole article bodies.
///
/// # Examples
///
/// ```
/// use focus_extract::utils::truncate_for_log;
///
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("Bonjour à tous", 9), "Bonjour à… (5 more chars)");
/// ```
pub fn truncate_for_log(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        None => Cow::Borrowed(s),
        Some((cut, _)) => {
            let dropped = s[cut..].chars().count();
            Cow::Owned(format!("{}… ({dropped} more chars)", &s[..cut]))
        }
    }
}
