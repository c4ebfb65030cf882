//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `RUST_LOG`, when set, takes precedence over the `--log-level` flag.

use crate::constants::{LOG_FORMAT_JSON, LOG_FORMAT_TEXT, TRACING_SERVICE_NAME};
use crate::errors::{AppError, AppResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Installs the global tracing subscriber.
///
/// `format` is either `"text"` or `"json"`.
///
/// # Errors
///
/// Returns `AppError::Config` for an unknown format, an unparseable level, or
/// when a global subscriber is already installed.
pub fn init_tracing(format: &str, level: &str) -> AppResult<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| AppError::Config(format!("Invalid log level '{}': {}", level, e)))?,
    };

    let result = match format {
        LOG_FORMAT_JSON => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            )
            .try_init(),
        LOG_FORMAT_TEXT => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            )
            .try_init(),
        other => {
            return Err(AppError::Config(format!(
                "Unknown log format '{}' (expected '{}' or '{}')",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            )))
        }
    };

    result.map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        service.name = TRACING_SERVICE_NAME,
        format,
        "Logging initialized"
    );
    Ok(())
}
