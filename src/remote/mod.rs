//! The remote reading source.
//!
//! The resolver depends only on the [`ReadingSource`] trait; [`RestReadingSource`]
//! is the production implementation and tests substitute scripted sources.
//!
//! # Example
//!
//! ```no_run
//! use daily_paths::calendar::ScheduledSlot;
//! use daily_paths::remote::{ReadingSource, RestReadingSource};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = RestReadingSource::new("https://example.supabase.co", "anon-key", Duration::from_secs(15))?;
//! let fetch = source.fetch_by_slot(ScheduledSlot::new(61)?).await?;
//! println!("found: {}", fetch.row.is_some());
//! # Ok(())
//! # }
//! ```

pub mod rest;

use crate::calendar::ScheduledSlot;
use crate::errors::RemoteError;
use crate::reading::RemoteRow;
use async_trait::async_trait;

pub use rest::RestReadingSource;

/// Result of a successful remote lookup.
///
/// `row` of `None` means the slot has no content yet, which is not an error.
#[derive(Debug, Clone)]
pub struct RemoteFetch {
    pub row: Option<RemoteRow>,
    pub version_token: Option<String>,
}

impl RemoteFetch {
    /// Builds a fetch result whose version token is taken from the row.
    pub fn from_row(row: Option<RemoteRow>) -> Self {
        let version_token = row
            .as_ref()
            .and_then(|r| r.version_token())
            .map(str::to_string);
        RemoteFetch { row, version_token }
    }

    pub fn not_found() -> Self {
        RemoteFetch {
            row: None,
            version_token: None,
        }
    }
}

/// A read-only source of readings keyed by content slot.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetches the reading scheduled for `slot`.
    async fn fetch_by_slot(&self, slot: ScheduledSlot) -> Result<RemoteFetch, RemoteError>;

    /// Lists the slots that have content, ascending.
    async fn available_slots(&self) -> Result<Vec<ScheduledSlot>, RemoteError>;
}
