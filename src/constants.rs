//! Constants used throughout the application.
//!
//! This module contains all constants used in the daily-paths reading core, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "daily-paths";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "Resolve, cache and prefetch daily readings by calendar date";

// Logging Configuration
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// Configuration Keys & Environment Variables
/// Environment variable for the remote reading source base URL.
pub const ENV_VAR_API_URL: &str = "DAILY_PATHS_API_URL";
/// Environment variable for the remote reading source API key.
pub const ENV_VAR_API_KEY: &str = "DAILY_PATHS_API_KEY";
/// Environment variable for the cache database path.
pub const ENV_VAR_CACHE_PATH: &str = "DAILY_PATHS_CACHE_PATH";
/// Environment variable for the default prefetch window.
pub const ENV_VAR_PREFETCH_DAYS: &str = "DAILY_PATHS_PREFETCH_DAYS";
/// Environment variable for the cache size bound.
pub const ENV_VAR_CACHE_MAX_ENTRIES: &str = "DAILY_PATHS_CACHE_MAX_ENTRIES";
/// Environment variable for the remote request timeout.
pub const ENV_VAR_TIMEOUT_SECS: &str = "DAILY_PATHS_TIMEOUT_SECS";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default cache location within the user's home directory.
pub const DEFAULT_CACHE_SUBPATH: &str = ".local/share/daily-paths/readings.db";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Calendar
/// Date format string for ISO date format (YYYY-MM-DD), the cache key format.
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Date format string for compact date format (YYYYMMDD).
pub const DATE_FORMAT_COMPACT: &str = "%Y%m%d";
/// Number of slots in the content calendar.
pub const SLOTS_PER_CALENDAR: u32 = 366;
/// Last day-of-year that maps to the same slot in every year (February 28).
pub const LAST_UNSHIFTED_DAY: u32 = 59;
/// Slot reserved for February 29.
pub const LEAP_DAY_SLOT: u32 = 60;

// Cache
/// Version of the stored reading format. Bump when the shape of `ReadingContent`
/// or the slot mapping changes; rows of other versions become unreachable.
pub const CACHE_FORMAT_VERSION: u32 = 6;
/// Prefix of every cache key; the format version is appended.
pub const CACHE_KEY_PREFIX: &str = "reading_v";
/// Default upper bound on cached readings (0 disables the bound).
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 400;
/// Maximum pooled connections to the cache database.
pub const CACHE_POOL_SIZE: u32 = 4;
/// How long a connection waits on a locked database before failing.
pub const CACHE_BUSY_TIMEOUT_MS: u64 = 5_000;

// Prefetch
/// Default number of dates prefetched, starting at the anchor date.
pub const DEFAULT_PREFETCH_DAYS: u32 = 7;
/// Largest accepted prefetch window.
pub const MAX_PREFETCH_DAYS: u32 = 31;

// Remote Source
/// Table path of readings on the REST endpoint.
pub const READINGS_PATH: &str = "/rest/v1/readings";
/// Default remote request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

// Tracing
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "daily-paths";
