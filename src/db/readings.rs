//! Row operations on cached readings.
//!
//! This module stores and retrieves serialized reading rows. It knows nothing about
//! the reading format itself; [`crate::cache`] owns (de)serialization and the
//! policy of swallowing failures.

use crate::errors::CacheError;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

/// A cached reading row as stored in the database.
#[derive(Debug, Clone)]
pub struct CachedRow {
    pub cache_key: String,
    pub date_key: String,
    pub format_version: u32,
    pub content_json: String,
    pub remote_version: Option<String>,
    pub cached_at: String,
    pub accessed_at: String,
}

/// Retrieves a row by key, only if it was written with `format_version`.
///
/// Returns `Ok(None)` if no matching row exists.
pub fn get_row(
    conn: &Connection,
    cache_key: &str,
    format_version: u32,
) -> Result<Option<CachedRow>, CacheError> {
    debug!("Getting cached row {}", cache_key);

    let row = conn
        .query_row(
            r#"
            SELECT cache_key, date_key, format_version, content_json, remote_version,
                   cached_at, accessed_at
            FROM reading_cache
            WHERE cache_key = ?1 AND format_version = ?2
            "#,
            params![cache_key, format_version],
            |row| {
                Ok(CachedRow {
                    cache_key: row.get(0)?,
                    date_key: row.get(1)?,
                    format_version: row.get(2)?,
                    content_json: row.get(3)?,
                    remote_version: row.get(4)?,
                    cached_at: row.get(5)?,
                    accessed_at: row.get(6)?,
                })
            },
        )
        .optional()?;

    Ok(row)
}

/// Inserts or overwrites the row under `cache_key`.
///
/// The row becomes the most recently accessed one.
pub fn upsert_row(
    conn: &Connection,
    cache_key: &str,
    date_key: &str,
    format_version: u32,
    content_json: &str,
    remote_version: Option<&str>,
) -> Result<(), CacheError> {
    debug!("Upserting cached row {}", cache_key);

    conn.execute(
        r#"
        INSERT INTO reading_cache
            (cache_key, date_key, format_version, content_json, remote_version,
             cached_at, accessed_at, access_seq)
        VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP,
                (SELECT COALESCE(MAX(access_seq), 0) + 1 FROM reading_cache))
        ON CONFLICT(cache_key) DO UPDATE SET
            date_key = excluded.date_key,
            format_version = excluded.format_version,
            content_json = excluded.content_json,
            remote_version = excluded.remote_version,
            cached_at = CURRENT_TIMESTAMP,
            accessed_at = CURRENT_TIMESTAMP,
            access_seq = excluded.access_seq
        "#,
        params![cache_key, date_key, format_version, content_json, remote_version],
    )?;

    Ok(())
}

/// Marks a row as the most recently accessed one.
pub fn touch_row(conn: &Connection, cache_key: &str) -> Result<(), CacheError> {
    conn.execute(
        r#"
        UPDATE reading_cache
        SET accessed_at = CURRENT_TIMESTAMP,
            access_seq = (SELECT COALESCE(MAX(access_seq), 0) + 1 FROM reading_cache)
        WHERE cache_key = ?1
        "#,
        params![cache_key],
    )?;
    Ok(())
}

/// Deletes every row not written with `format_version`.
///
/// Returns the number of deleted rows.
pub fn delete_other_versions(conn: &Connection, format_version: u32) -> Result<usize, CacheError> {
    let deleted = conn.execute(
        "DELETE FROM reading_cache WHERE format_version != ?1",
        params![format_version],
    )?;
    debug!("Deleted {} rows of other format versions", deleted);
    Ok(deleted)
}

/// Keeps only the `max_entries` most recently accessed rows.
///
/// Returns the number of deleted rows.
pub fn prune_least_recent(conn: &Connection, max_entries: usize) -> Result<usize, CacheError> {
    let deleted = conn.execute(
        r#"
        DELETE FROM reading_cache
        WHERE cache_key NOT IN (
            SELECT cache_key FROM reading_cache
            ORDER BY access_seq DESC
            LIMIT ?1
        )
        "#,
        params![max_entries as i64],
    )?;
    if deleted > 0 {
        debug!("Pruned {} least recently used rows", deleted);
    }
    Ok(deleted)
}

/// Counts rows written with `format_version`.
pub fn count_rows(conn: &Connection, format_version: u32) -> Result<usize, CacheError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reading_cache WHERE format_version = ?1",
        params![format_version],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Counts rows of any other format version.
pub fn count_legacy_rows(conn: &Connection, format_version: u32) -> Result<usize, CacheError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reading_cache WHERE format_version != ?1",
        params![format_version],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Earliest and latest cached date keys for `format_version`.
pub fn date_key_range(
    conn: &Connection,
    format_version: u32,
) -> Result<Option<(String, String)>, CacheError> {
    let range: (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(date_key), MAX(date_key) FROM reading_cache WHERE format_version = ?1",
        params![format_version],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(match range {
        (Some(first), Some(last)) => Some((first, last)),
        _ => None,
    })
}
