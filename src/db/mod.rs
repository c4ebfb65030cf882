//! Database handle for the local reading cache.
//!
//! This module provides SQLite storage for cached readings. It uses connection
//! pooling via r2d2 so the resolver and the prefetch scheduler can read and write
//! different dates at the same time.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `readings`: Row-level operations on cached readings
//!
//! # Example
//!
//! ```no_run
//! use daily_paths::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/daily-paths.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod readings;
pub mod schema;

use crate::constants::{CACHE_BUSY_TIMEOUT_MS, CACHE_POOL_SIZE};
use crate::errors::{AppResult, CacheError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle with connection pooling.
///
/// Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates the cache database file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - The database file cannot be opened
    /// - Connection pool cannot be initialized
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening cache database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let db = Self::with_pool(Pool::builder().max_size(CACHE_POOL_SIZE), manager)?;

        info!("Cache database opened successfully");
        Ok(db)
    }

    /// Opens a private in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool holds
    /// exactly one connection and never recycles it: a replacement connection
    /// would start from an empty database.
    pub fn open_in_memory() -> AppResult<Self> {
        let builder = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::with_pool(builder, SqliteConnectionManager::memory())
    }

    fn with_pool(
        builder: r2d2::Builder<SqliteConnectionManager>,
        manager: SqliteConnectionManager,
    ) -> AppResult<Self> {
        let pool = builder
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)
            .map_err(CacheError::Pool)?;

        // Test the connection
        let conn = pool.get().map_err(CacheError::Pool)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(CacheError::Sqlite)?;
        drop(conn);

        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> Result<PooledConnection, CacheError> {
        self.pool.get().map_err(CacheError::Pool)
    }

    /// Initializes the database schema.
    ///
    /// Creates all necessary tables and indexes if they don't exist.
    /// This is idempotent and safe to call multiple times.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Cache schema initialized");
        Ok(())
    }
}

/// Connection customizer applied to every pooled connection.
#[derive(Debug)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.busy_timeout(Duration::from_millis(CACHE_BUSY_TIMEOUT_MS))?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}
