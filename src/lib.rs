/*!
# Daily Paths

The reading core of a daily devotional: it decides which reading belongs to a
calendar date, serves it from a local cache while checking the remote source
for a newer version, and fills the cache ahead of need.

## Core Features

- Leap-year-corrected mapping of dates to a fixed 366-slot content calendar
- Persistent SQLite cache keyed by local date and cache format version
- Stale-while-revalidate resolution that emits cached content first
- Best-effort prefetch of upcoming dates, at most once per date per process

## Architecture

- `calendar`: Date to slot mapping and local date keys
- `reading`: Reading content model and text normalization
- `db` / `cache`: The local cache store
- `remote`: The remote reading source and its REST client
- `resolver`: Date to reading resolution
- `prefetch`: The prefetch scheduler
- `cli`, `config`, `logging`, `errors`: Ambient plumbing for the binary

## Usage Example

```rust,no_run
use daily_paths::{CalendarDate, Config, Database, ReadingCache, Resolver, RestReadingSource};
use std::sync::Arc;

# async fn run() -> daily_paths::AppResult<()> {
let config = Config::load()?;
let cache = ReadingCache::new(Database::open(&config.cache_path)?, config.cache_max_entries)?;
let source = Arc::new(RestReadingSource::from_config(&config)?);
let resolver = Resolver::new(source, cache);

let update = resolver.resolve_once(CalendarDate::today()).await;
println!("{}", update.state().as_str());
# Ok(())
# }
```
*/

/// Local cache store for normalized readings
pub mod cache;
/// Date to content slot mapping
pub mod calendar;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// SQLite connection pool and cache tables
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Tracing subscriber setup
pub mod logging;
/// Prefetch scheduler
pub mod prefetch;
/// Reading content model and text normalization
pub mod reading;
/// Remote reading source
pub mod remote;
/// Date to reading resolution
pub mod resolver;

// Re-export important types for convenience
pub use cache::{CacheEntry, ReadingCache};
pub use calendar::{to_scheduled_slot, CalendarDate, ScheduledSlot};
pub use cli::CliArgs;
pub use config::Config;
pub use db::Database;
pub use errors::{AppError, AppResult};
pub use prefetch::{PrefetchLedger, PrefetchReport, Prefetcher};
pub use reading::ReadingContent;
pub use remote::{ReadingSource, RestReadingSource};
pub use resolver::{ReadingState, ReadingUpdate, Resolver};
