//! Durable local cache of resolved readings.
//!
//! Entries are keyed by local calendar date under a versioned namespace
//! (`reading_v{FORMAT}:YYYY-MM-DD`). `get` and `put` never fail: storage errors
//! are logged and degrade to "no cache available", which pushes the resolver
//! towards the remote source.

use crate::calendar::{format_local_key, CalendarDate};
use crate::constants::{CACHE_FORMAT_VERSION, CACHE_KEY_PREFIX};
use crate::db::{readings, Database};
use crate::errors::{AppResult, CacheError};
use crate::reading::ReadingContent;
use tracing::{debug, info, warn};

/// Cached content for one date plus the remote freshness token it was stored with.
///
/// `remote_version` of `None` means "no known version": the entry is trusted until
/// any remote row replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub content: ReadingContent,
    pub remote_version: Option<String>,
}

impl CacheEntry {
    pub fn new(content: ReadingContent, remote_version: Option<String>) -> Self {
        CacheEntry {
            content,
            remote_version,
        }
    }

    /// Whether a remote row carrying `remote_version` should replace this entry.
    ///
    /// Tokens are compared as plain strings, which orders ISO-8601 timestamps
    /// chronologically. A remote row without a token never beats a versioned entry.
    ///
    /// ```
    /// use daily_paths::cache::CacheEntry;
    /// # use daily_paths::reading::{ReadingContent, Quotation};
    /// # let content = ReadingContent {
    /// #     id: "1".into(), title: "T".into(), opening: String::new(), body: vec![],
    /// #     quote: Quotation::default(), application: vec![], thought_for_day: String::new(),
    /// # };
    /// let entry = CacheEntry::new(content, Some("2024-01-01T00:00:00Z".to_string()));
    /// assert!(entry.is_superseded_by(Some("2024-01-02T00:00:00Z")));
    /// assert!(!entry.is_superseded_by(Some("2024-01-01T00:00:00Z")));
    /// assert!(!entry.is_superseded_by(None));
    /// ```
    pub fn is_superseded_by(&self, remote_version: Option<&str>) -> bool {
        match (self.remote_version.as_deref(), remote_version) {
            (None, _) => true,
            (Some(cached), Some(remote)) => remote > cached,
            (Some(_), None) => false,
        }
    }
}

/// Whether remote content should be stored given what is cached for the date.
pub fn is_newer_than_cached(cached: Option<&CacheEntry>, remote_version: Option<&str>) -> bool {
    cached.map_or(true, |entry| entry.is_superseded_by(remote_version))
}

/// Summary of the cache contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries readable under the current format version
    pub entries: usize,
    /// Entries left behind by older format versions
    pub legacy_entries: usize,
    /// Earliest and latest cached local dates
    pub date_range: Option<(String, String)>,
}

/// The local cache store.
///
/// Cloning is cheap and shares the underlying connection pool; the resolver and
/// the prefetch scheduler each hold a clone.
#[derive(Clone)]
pub struct ReadingCache {
    db: Database,
    max_entries: Option<usize>,
}

/// The storage key of a date under the current format version.
///
/// ```
/// use daily_paths::cache::cache_key;
/// use daily_paths::calendar::CalendarDate;
///
/// let key = cache_key(CalendarDate::new(2024, 3, 1).unwrap());
/// assert!(key.starts_with("reading_v"));
/// assert!(key.ends_with(":2024-03-01"));
/// ```
pub fn cache_key(date: CalendarDate) -> String {
    format!(
        "{}{}:{}",
        CACHE_KEY_PREFIX,
        CACHE_FORMAT_VERSION,
        format_local_key(date)
    )
}

impl ReadingCache {
    /// Wraps a database, creating the cache tables if needed.
    ///
    /// `max_entries` bounds the number of stored readings; the least recently
    /// accessed ones are dropped after each write. `None` keeps everything.
    pub fn new(db: Database, max_entries: Option<usize>) -> AppResult<Self> {
        db.initialize_schema()?;
        Ok(ReadingCache { db, max_entries })
    }

    /// An unbounded cache backed by a private in-memory database.
    pub fn in_memory() -> AppResult<Self> {
        Self::new(Database::open_in_memory()?, None)
    }

    /// Looks up the entry for `date`.
    ///
    /// Stored paragraphs are re-normalized on the way out, since older builds may
    /// have cached text with escaped breaks. Any storage failure is a miss.
    pub fn get(&self, date: CalendarDate) -> Option<CacheEntry> {
        match self.try_get(date) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Reading cache lookup for {} failed, treating as miss: {}", date, e);
                None
            }
        }
    }

    /// Stores `entry` under `date`, replacing whatever was there.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn put(&self, date: CalendarDate, entry: &CacheEntry) {
        if let Err(e) = self.try_put(date, entry) {
            warn!("Failed to cache reading for {}: {}", date, e);
        }
    }

    fn try_get(&self, date: CalendarDate) -> Result<Option<CacheEntry>, CacheError> {
        let key = cache_key(date);
        let conn = self.db.get_conn()?;

        let Some(row) = readings::get_row(&conn, &key, CACHE_FORMAT_VERSION)? else {
            debug!("Cache miss for {}", date);
            return Ok(None);
        };

        let content: ReadingContent = serde_json::from_str(&row.content_json)?;

        if let Err(e) = readings::touch_row(&conn, &key) {
            debug!("Could not record access to {}: {}", key, e);
        }

        debug!("Cache hit for {} (version {:?})", date, row.remote_version);
        Ok(Some(CacheEntry {
            content: content.renormalized(),
            remote_version: row.remote_version,
        }))
    }

    fn try_put(&self, date: CalendarDate, entry: &CacheEntry) -> Result<(), CacheError> {
        let content_json = serde_json::to_string(&entry.content)?;
        let conn = self.db.get_conn()?;

        readings::upsert_row(
            &conn,
            &cache_key(date),
            &format_local_key(date),
            CACHE_FORMAT_VERSION,
            &content_json,
            entry.remote_version.as_deref(),
        )?;

        if let Some(max) = self.max_entries {
            readings::prune_least_recent(&conn, max)?;
        }

        debug!("Cached reading for {}", date);
        Ok(())
    }

    /// Counts and date range of stored entries.
    pub fn stats(&self) -> AppResult<CacheStats> {
        let conn = self.db.get_conn()?;
        Ok(CacheStats {
            entries: readings::count_rows(&conn, CACHE_FORMAT_VERSION)?,
            legacy_entries: readings::count_legacy_rows(&conn, CACHE_FORMAT_VERSION)?,
            date_range: readings::date_key_range(&conn, CACHE_FORMAT_VERSION)?,
        })
    }

    /// Keeps only the `max_entries` most recently accessed entries.
    ///
    /// Returns the number of removed entries.
    pub fn prune(&self, max_entries: usize) -> AppResult<usize> {
        let conn = self.db.get_conn()?;
        let removed = readings::prune_least_recent(&conn, max_entries)?;
        info!("Pruned {} cached readings (limit {})", removed, max_entries);
        Ok(removed)
    }

    /// Deletes entries written under any other format version.
    ///
    /// Such entries are already unreachable through `get`; this reclaims their
    /// storage. Returns the number of removed entries.
    pub fn purge_legacy(&self) -> AppResult<usize> {
        let conn = self.db.get_conn()?;
        let removed = readings::delete_other_versions(&conn, CACHE_FORMAT_VERSION)?;
        if removed > 0 {
            info!("Purged {} cached readings of older formats", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Quotation;

    fn content(id: &str, body: &[&str]) -> ReadingContent {
        ReadingContent {
            id: id.to_string(),
            title: "Title".to_string(),
            opening: "Opening".to_string(),
            body: body.iter().map(|p| p.to_string()).collect(),
            quote: Quotation {
                text: "Quote".to_string(),
                attribution: Some("Source".to_string()),
            },
            application: vec![],
            thought_for_day: "Thought".to_string(),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::new(year, month, day).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let cache = ReadingCache::in_memory().unwrap();
        let entry = CacheEntry::new(content("1", &["A", "B"]), Some("v1".to_string()));

        cache.put(date(2024, 3, 1), &entry);

        assert_eq!(cache.get(date(2024, 3, 1)), Some(entry));
        assert_eq!(cache.get(date(2024, 3, 2)), None);
    }

    #[test]
    fn test_get_renormalizes_legacy_paragraphs() {
        let cache = ReadingCache::in_memory().unwrap();
        let legacy = CacheEntry::new(content("1", &["One.\\n\\nTwo."]), None);

        cache.put(date(2024, 1, 5), &legacy);

        let read = cache.get(date(2024, 1, 5)).unwrap();
        assert_eq!(read.content.body, vec!["One.", "Two."]);
    }

    #[test]
    fn test_corrupt_row_is_a_miss() {
        let cache = ReadingCache::in_memory().unwrap();
        let conn = cache.db.get_conn().unwrap();
        readings::upsert_row(
            &conn,
            &cache_key(date(2024, 1, 1)),
            "2024-01-01",
            CACHE_FORMAT_VERSION,
            "not json",
            None,
        )
        .unwrap();
        drop(conn);

        assert!(cache.get(date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_bounded_cache_drops_least_recently_used() {
        let cache = ReadingCache::new(Database::open_in_memory().unwrap(), Some(2)).unwrap();
        let entry = CacheEntry::new(content("x", &["P"]), None);

        cache.put(date(2024, 1, 1), &entry);
        cache.put(date(2024, 1, 2), &entry);
        assert!(cache.get(date(2024, 1, 1)).is_some());
        cache.put(date(2024, 1, 3), &entry);

        assert!(cache.get(date(2024, 1, 1)).is_some());
        assert!(cache.get(date(2024, 1, 2)).is_none());
        assert!(cache.get(date(2024, 1, 3)).is_some());
    }

    #[test]
    fn test_freshness_rules() {
        let unversioned = CacheEntry::new(content("1", &[]), None);
        assert!(unversioned.is_superseded_by(None));
        assert!(unversioned.is_superseded_by(Some("2020-01-01T00:00:00Z")));

        let versioned = CacheEntry::new(content("1", &[]), Some("2024-01-02T00:00:00Z".into()));
        assert!(!versioned.is_superseded_by(Some("2024-01-01T00:00:00Z")));
        assert!(versioned.is_superseded_by(Some("2024-01-02T00:00:01Z")));

        assert!(is_newer_than_cached(None, None));
        assert!(!is_newer_than_cached(Some(&versioned), None));
    }

    #[test]
    fn test_stats_and_purge_legacy() {
        let cache = ReadingCache::in_memory().unwrap();
        cache.put(date(2024, 1, 1), &CacheEntry::new(content("1", &[]), None));

        let conn = cache.db.get_conn().unwrap();
        readings::upsert_row(&conn, "reading_v1:2023-01-01", "2023-01-01", 1, "{}", None)
            .unwrap();
        drop(conn);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.legacy_entries, 1);
        assert_eq!(
            stats.date_range,
            Some(("2024-01-01".to_string(), "2024-01-01".to_string()))
        );

        assert_eq!(cache.purge_legacy().unwrap(), 1);
        assert_eq!(cache.stats().unwrap().legacy_entries, 0);
    }
}
