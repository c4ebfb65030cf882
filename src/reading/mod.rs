//! Reading content and its mapping from remote rows.
//!
//! A [`RemoteRow`] is the loosely-shaped record served by the remote source; a
//! [`ReadingContent`] is the normalized payload handed to callers and stored in
//! the cache. [`ReadingContent::from_row`] is the only way from one to the other.

pub mod text;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A quotation with an optional trailing attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

impl Quotation {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.attribution.is_none()
    }
}

/// The normalized daily reading.
///
/// `body` and `application` are ordered paragraph lists with no embedded blank
/// lines; every text field has had escaped newlines replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingContent {
    pub id: String,
    pub title: String,
    pub opening: String,
    pub body: Vec<String>,
    #[serde(default)]
    pub quote: Quotation,
    /// Optional application section; empty when the reading has none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub application: Vec<String>,
    pub thought_for_day: String,
}

impl ReadingContent {
    /// Normalizes a remote row into reading content.
    ///
    /// # Examples
    ///
    /// ```
    /// use daily_paths::reading::{ReadingContent, RemoteRow};
    ///
    /// let row: RemoteRow = serde_json::from_value(serde_json::json!({
    ///     "id": 7,
    ///     "title": "Stillness",
    ///     "opening": "Begin here.",
    ///     "body": "First.\\n\\nSecond.",
    ///     "todays_application": "Rest. (Anon)",
    ///     "thought_for_day": "Pause.",
    ///     "updated_at": "2024-01-02T00:00:00Z"
    /// }))
    /// .unwrap();
    ///
    /// let content = ReadingContent::from_row(&row);
    /// assert_eq!(content.id, "7");
    /// assert_eq!(content.body, vec!["First.", "Second."]);
    /// assert_eq!(content.quote.text, "Rest.");
    /// assert_eq!(content.quote.attribution.as_deref(), Some("Anon"));
    /// ```
    pub fn from_row(row: &RemoteRow) -> Self {
        let (quote_text, attribution) = match row.quote_source() {
            QuoteSource::Current(raw) | QuoteSource::Legacy(raw) => text::split_attribution(raw),
            QuoteSource::Missing => (String::new(), None),
        };

        ReadingContent {
            id: row.id.to_string(),
            title: text::normalize_field(row.title.as_deref().unwrap_or_default()),
            opening: text::normalize_field(row.opening.as_deref().unwrap_or_default()),
            body: text::split_paragraphs(row.body.as_deref().unwrap_or_default()),
            quote: Quotation {
                text: quote_text,
                attribution,
            },
            application: text::split_paragraphs(row.application.as_deref().unwrap_or_default()),
            thought_for_day: text::normalize_field(
                row.thought_for_day.as_deref().unwrap_or_default(),
            ),
        }
    }

    /// Re-applies normalization to content that may predate it.
    ///
    /// Normalizing twice equals normalizing once.
    pub fn renormalized(self) -> Self {
        ReadingContent {
            title: text::normalize_field(&self.title),
            opening: text::normalize_field(&self.opening),
            body: text::renormalize_paragraphs(&self.body),
            application: text::renormalize_paragraphs(&self.application),
            thought_for_day: text::normalize_field(&self.thought_for_day),
            ..self
        }
    }

    /// The opening split at blank lines.
    pub fn opening_paragraphs(&self) -> Vec<String> {
        text::split_paragraphs(&self.opening)
    }

    pub fn has_application(&self) -> bool {
        !self.application.is_empty()
    }
}

/// Identifier of a remote row; the backend has served both numeric and textual ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Number(n) => write!(f, "{}", n),
            RowId::Text(s) => f.write_str(s),
        }
    }
}

/// A reading row as served by the remote source.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRow {
    pub id: RowId,
    #[serde(default)]
    pub day_of_year: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub opening: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    /// Legacy name of `quote`.
    #[serde(default)]
    pub todays_application: Option<String>,
    #[serde(default)]
    pub application: Option<String>,
    #[serde(default)]
    pub thought_for_day: Option<String>,
    /// Last-modified timestamp; used as the freshness token.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Where the quote text of a row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource<'a> {
    Current(&'a str),
    Legacy(&'a str),
    Missing,
}

impl RemoteRow {
    /// Picks the quote field in priority order: `quote`, then the legacy
    /// `todays_application`. A present-but-empty `quote` still wins.
    pub fn quote_source(&self) -> QuoteSource<'_> {
        match (&self.quote, &self.todays_application) {
            (Some(quote), _) => QuoteSource::Current(quote),
            (None, Some(legacy)) => QuoteSource::Legacy(legacy),
            (None, None) => QuoteSource::Missing,
        }
    }

    /// Whether the row is filed under `slot`. Rows that omit their slot are
    /// taken at their word.
    pub fn is_for_slot(&self, slot: u32) -> bool {
        self.day_of_year.map_or(true, |day| day == slot)
    }

    /// The freshness token of this row.
    pub fn version_token(&self) -> Option<&str> {
        self.updated_at.as_deref().filter(|v| !v.is_empty())
    }
}
