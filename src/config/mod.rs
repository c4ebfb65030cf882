//! Configuration management for the daily-paths reading core.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `DAILY_PATHS_API_URL`: Base URL of the remote reading source (unset = offline mode)
//! - `DAILY_PATHS_API_KEY`: API key for the remote reading source (required with the URL)
//! - `DAILY_PATHS_CACHE_PATH`: Cache database file (defaults to ~/.local/share/daily-paths/readings.db)
//! - `DAILY_PATHS_PREFETCH_DAYS`: Default prefetch window, 1-31 (defaults to 7)
//! - `DAILY_PATHS_CACHE_MAX_ENTRIES`: Cache size bound, 0 for unbounded (defaults to 400)
//! - `DAILY_PATHS_TIMEOUT_SECS`: Remote request timeout (defaults to 15)
//! - `HOME`: Used for expanding the default cache path

use crate::constants::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_SUBPATH, DEFAULT_PREFETCH_DAYS, DEFAULT_TIMEOUT_SECS,
    ENV_VAR_API_KEY, ENV_VAR_API_URL, ENV_VAR_CACHE_MAX_ENTRIES, ENV_VAR_CACHE_PATH,
    ENV_VAR_HOME, ENV_VAR_PREFETCH_DAYS, ENV_VAR_TIMEOUT_SECS, MAX_PREFETCH_DAYS,
    REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the reading core.
///
/// # Examples
///
/// Loading configuration from environment variables:
/// ```no_run
/// use daily_paths::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
/// println!("prefetching {} days", config.prefetch_days);
/// ```
pub struct Config {
    /// Base URL of the remote reading source. `None` runs the core offline.
    pub api_url: Option<String>,

    /// API key for the remote reading source.
    pub api_key: Option<String>,

    /// Location of the SQLite cache database.
    pub cache_path: PathBuf,

    /// Default number of dates to prefetch, starting at the anchor date.
    pub prefetch_days: u32,

    /// Upper bound on cached readings. `None` keeps every reading.
    pub cache_max_entries: Option<usize>,

    /// Timeout for each remote request.
    pub request_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .field("cache_path", &self.cache_path)
            .field("prefetch_days", &self.prefetch_days)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: None,
            api_key: None,
            cache_path: PathBuf::from(""),
            prefetch_days: DEFAULT_PREFETCH_DAYS,
            cache_max_entries: Some(DEFAULT_CACHE_MAX_ENTRIES),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Reads an optional variable, treating empty values as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads and parses a numeric variable, falling back to `default` when unset.
fn numeric_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match optional_var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", name, raw))),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The cache path is expanded using `shellexpand` to handle `~` and
    /// environment variable references, then the result is validated.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - A numeric variable does not parse
    /// - The cache path expansion fails
    /// - The resulting configuration fails [`Config::validate`]
    pub fn load() -> AppResult<Self> {
        let api_url = optional_var(ENV_VAR_API_URL);
        let api_key = optional_var(ENV_VAR_API_KEY);

        let cache_path_str = optional_var(ENV_VAR_CACHE_PATH).unwrap_or_else(|| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_CACHE_SUBPATH)
        });

        // Expand the path (handles ~ and environment variables)
        let expanded_path = shellexpand::full(&cache_path_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;

        let prefetch_days = numeric_var(ENV_VAR_PREFETCH_DAYS, DEFAULT_PREFETCH_DAYS)?;
        let max_entries = numeric_var(ENV_VAR_CACHE_MAX_ENTRIES, DEFAULT_CACHE_MAX_ENTRIES)?;
        let timeout_secs = numeric_var(ENV_VAR_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?;

        let config = Config {
            api_url,
            api_key,
            cache_path: PathBuf::from(expanded_path.into_owned()),
            prefetch_days,
            cache_max_entries: (max_entries > 0).then_some(max_entries),
            request_timeout: Duration::from_secs(timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Cache path is empty" / "Cache path must be an absolute path"
    /// - "API URL must start with http:// or https://"
    /// - "API URL and API key must be set together"
    /// - "Prefetch window must be between 1 and 31 days"
    /// - "Request timeout must be greater than zero"
    ///
    /// # Examples
    ///
    /// ```
    /// use daily_paths::Config;
    /// use std::path::PathBuf;
    ///
    /// let config = Config {
    ///     cache_path: PathBuf::from("/tmp/readings.db"),
    ///     ..Config::default()
    /// };
    /// assert!(config.validate().is_ok());
    ///
    /// let config = Config {
    ///     cache_path: PathBuf::from("/tmp/readings.db"),
    ///     api_url: Some("https://example.test".to_string()),
    ///     ..Config::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        if self.cache_path.as_os_str().is_empty() {
            return Err(AppError::Config("Cache path is empty".to_string()));
        }

        if !self.cache_path.is_absolute() {
            return Err(AppError::Config(
                "Cache path must be an absolute path".to_string(),
            ));
        }

        if let Some(url) = &self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(
                    "API URL must start with http:// or https://".to_string(),
                ));
            }
        }

        if self.api_url.is_some() != self.api_key.is_some() {
            return Err(AppError::Config(format!(
                "API URL and API key must be set together ({} and {})",
                ENV_VAR_API_URL, ENV_VAR_API_KEY
            )));
        }

        if !(1..=MAX_PREFETCH_DAYS).contains(&self.prefetch_days) {
            return Err(AppError::Config(format!(
                "Prefetch window must be between 1 and {} days",
                MAX_PREFETCH_DAYS
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(AppError::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a remote endpoint is configured.
    pub fn is_online(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }
}
