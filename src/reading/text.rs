//! Text normalization for reading content.
//!
//! Content is authored inconsistently: some rows carry real newlines, others the
//! two-character sequence `\n`. Everything here is idempotent, so text that has
//! already been normalized passes through unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

/// One or more blank lines.
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*").expect("paragraph break pattern is valid"));

/// Quote text followed by a trailing `(attribution)` at the very end.
static TRAILING_ATTRIBUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(.*?)\s*\(([^()]*)\)\s*$").expect("attribution pattern is valid")
});

/// Replaces literal `\n` escape sequences (and CRLF) with real newlines.
///
/// ```
/// use daily_paths::reading::text::unescape_newlines;
///
/// assert_eq!(unescape_newlines(r"one\n\ntwo"), "one\n\ntwo");
/// ```
pub fn unescape_newlines(raw: &str) -> String {
    raw.replace("\\n", "\n").replace("\r\n", "\n")
}

/// Splits text into trimmed, non-empty paragraphs at blank-line boundaries.
///
/// ```
/// use daily_paths::reading::text::split_paragraphs;
///
/// assert_eq!(
///     split_paragraphs(r"First.\n\nSecond.\n\n\n  Third.  "),
///     vec!["First.", "Second.", "Third."]
/// );
/// assert!(split_paragraphs("  ").is_empty());
/// ```
pub fn split_paragraphs(raw: &str) -> Vec<String> {
    let text = unescape_newlines(raw);
    PARAGRAPH_BREAK
        .split(&text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Re-splits an already-split paragraph list.
///
/// Entries cached by older builds may hold a whole body with escaped breaks in a
/// single element; this flattens them into proper paragraphs.
pub fn renormalize_paragraphs(paragraphs: &[String]) -> Vec<String> {
    paragraphs.iter().flat_map(|p| split_paragraphs(p)).collect()
}

/// Unescapes and trims a single free-text field.
pub fn normalize_field(raw: &str) -> String {
    unescape_newlines(raw).trim().to_string()
}

/// Splits the first paragraph of a quote into text and trailing attribution.
///
/// Only the first paragraph of the quote field is kept. An empty `()` yields no
/// attribution.
///
/// ```
/// use daily_paths::reading::text::split_attribution;
///
/// let (text, attribution) = split_attribution(r#""Be still." (Psalm 46:10)"#);
/// assert_eq!(text, r#""Be still.""#);
/// assert_eq!(attribution.as_deref(), Some("Psalm 46:10"));
///
/// let (text, attribution) = split_attribution("No source here.");
/// assert_eq!(text, "No source here.");
/// assert!(attribution.is_none());
/// ```
pub fn split_attribution(raw: &str) -> (String, Option<String>) {
    let first = split_paragraphs(raw).into_iter().next().unwrap_or_default();

    match TRAILING_ATTRIBUTION.captures(&first) {
        Some(caps) => {
            let text = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
            let attribution = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|a| !a.is_empty())
                .map(str::to_string);
            (text, attribution)
        }
        None => (first, None),
    }
}
