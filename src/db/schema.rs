//! Database schema definitions and initialization.
//!
//! This module defines the SQLite schema for cached readings.

use crate::errors::CacheError;
use rusqlite::Connection;
use tracing::debug;

/// Current schema version, stored in `PRAGMA user_version`.
///
/// Increment this whenever table layout changes are made to support future migrations.
/// This is independent of the stored reading format, which is versioned per row.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates all database tables and indexes.
///
/// This function is idempotent - it uses `CREATE TABLE IF NOT EXISTS`
/// so it's safe to call multiple times.
///
/// # Tables
///
/// - `reading_cache`: one row per cached local date and format version
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn create_tables(conn: &Connection) -> Result<(), CacheError> {
    debug!("Creating database tables");

    // Reading cache: last-known content per local date
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS reading_cache (
            cache_key TEXT PRIMARY KEY,
            date_key TEXT NOT NULL,
            format_version INTEGER NOT NULL,
            content_json TEXT NOT NULL,
            remote_version TEXT,
            cached_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            accessed_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            access_seq INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_reading_cache_version ON reading_cache(format_version);
        CREATE INDEX IF NOT EXISTS idx_reading_cache_access_seq ON reading_cache(access_seq);
        "#,
    )?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    debug!("Database tables created (schema version {})", SCHEMA_VERSION);
    Ok(())
}

/// Reads the schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> Result<i32, CacheError> {
    let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}
