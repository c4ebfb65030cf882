//! Date-to-reading resolution.
//!
//! The resolver turns a calendar date into reading updates:
//!
//! 1. Map the date to its content slot.
//! 2. Emit the cached content, if any, as [`ReadingUpdate::Provisional`].
//! 3. Ask the remote source for the slot.
//! 4. Normalize a returned row and, if it is newer than the cache, store it and
//!    emit [`ReadingUpdate::Final`].
//!
//! Availability wins over freshness: a remote failure or a missing row never
//! replaces content that is already cached. Only when nothing is cached does the
//! caller see [`ReadingUpdate::Error`] or [`ReadingUpdate::Absent`].

use crate::cache::{is_newer_than_cached, CacheEntry, ReadingCache};
use crate::calendar::{format_local_key, to_scheduled_slot, CalendarDate, ScheduledSlot};
use crate::errors::{CacheError, RemoteError};
use crate::reading::ReadingContent;
use crate::remote::ReadingSource;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Phase of a reading update, as seen by a UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingState {
    Provisional,
    Final,
    Absent,
    Error,
}

impl ReadingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingState::Provisional => "provisional",
            ReadingState::Final => "final",
            ReadingState::Absent => "absent",
            ReadingState::Error => "error",
        }
    }
}

/// One emission of a resolution.
///
/// For a given date a `Provisional` update always precedes any `Final` one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingUpdate {
    /// Cached content, possibly stale, shown while the remote is consulted.
    Provisional(ReadingContent),
    /// Remote content newer than anything cached; it has been written back.
    Final(ReadingContent),
    /// No content exists for this date and nothing is cached.
    Absent,
    /// The remote failed and nothing is cached.
    Error { message: String },
}

impl ReadingUpdate {
    pub fn state(&self) -> ReadingState {
        match self {
            ReadingUpdate::Provisional(_) => ReadingState::Provisional,
            ReadingUpdate::Final(_) => ReadingState::Final,
            ReadingUpdate::Absent => ReadingState::Absent,
            ReadingUpdate::Error { .. } => ReadingState::Error,
        }
    }

    pub fn content(&self) -> Option<&ReadingContent> {
        match self {
            ReadingUpdate::Provisional(content) | ReadingUpdate::Final(content) => Some(content),
            ReadingUpdate::Absent | ReadingUpdate::Error { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ReadingUpdate::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// What a fetch-normalize-store pass did.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A newer row was normalized and written to the cache.
    Stored(ReadingContent),
    /// The cache already holds this version or a newer one.
    UpToDate,
    /// The remote has no row for the slot.
    NotFound,
    /// The remote could not be reached or answered badly.
    Failed(RemoteError),
}

/// Resolves dates to readings through the cache and the remote source.
///
/// Cloning is cheap; clones share the source and the cache.
#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn ReadingSource>,
    cache: ReadingCache,
}

impl Resolver {
    pub fn new(source: Arc<dyn ReadingSource>, cache: ReadingCache) -> Self {
        Resolver { source, cache }
    }

    pub fn cache(&self) -> &ReadingCache {
        &self.cache
    }

    pub fn source(&self) -> &Arc<dyn ReadingSource> {
        &self.source
    }

    /// Resolves `date` on a background task and streams its updates.
    ///
    /// The stream yields at most two items and ends when the resolution is done.
    /// Must be called from within a tokio runtime.
    pub fn resolve(&self, date: CalendarDate) -> ReceiverStream<ReadingUpdate> {
        let (tx, rx) = mpsc::channel(2);
        let resolver = self.clone();

        tokio::spawn(async move {
            resolver
                .resolve_with(date, |update| {
                    // A closed receiver means the caller stopped listening; the
                    // resolution still finishes and fills the cache.
                    let _ = tx.try_send(update);
                })
                .await;
        });

        ReceiverStream::new(rx)
    }

    /// Resolves `date` and returns the last update, i.e. what a UI would
    /// finally display.
    pub async fn resolve_once(&self, date: CalendarDate) -> ReadingUpdate {
        let mut last = None;
        self.resolve_with(date, |update| last = Some(update)).await;
        last.unwrap_or(ReadingUpdate::Absent)
    }

    /// Resolves `date`, handing each update to `emit` as it becomes available.
    pub async fn resolve_with<F>(&self, date: CalendarDate, mut emit: F)
    where
        F: FnMut(ReadingUpdate) + Send,
    {
        let slot = to_scheduled_slot(date);
        let span = info_span!(
            "resolve",
            date = %format_local_key(date),
            slot = slot.get(),
            request_id = %Uuid::new_v4()
        );

        async move {
            let cached = self.cached(date).await;
            if let Some(entry) = &cached {
                debug!("Serving cached reading while fetching");
                emit(ReadingUpdate::Provisional(entry.content.clone()));
            }

            match self.fetch_and_store(date, slot, cached.as_ref()).await {
                FetchOutcome::Stored(content) => emit(ReadingUpdate::Final(content)),
                FetchOutcome::UpToDate => debug!("Cached reading is current"),
                FetchOutcome::NotFound if cached.is_none() => {
                    info!("No reading scheduled for this date");
                    emit(ReadingUpdate::Absent);
                }
                FetchOutcome::NotFound => debug!("Remote has no row; keeping cached reading"),
                FetchOutcome::Failed(e) if cached.is_none() => {
                    warn!("Reading unavailable: {}", e);
                    emit(ReadingUpdate::Error {
                        message: e.to_string(),
                    });
                }
                FetchOutcome::Failed(e) => {
                    warn!("Remote fetch failed; keeping cached reading: {}", e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Reads the cache entry for `date` off the async executor.
    ///
    /// A failed blocking task counts as a miss, like any other cache failure.
    pub async fn cached(&self, date: CalendarDate) -> Option<CacheEntry> {
        let cache = self.cache.clone();
        match tokio::task::spawn_blocking(move || cache.get(date)).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{}", CacheError::Task(e.to_string()));
                None
            }
        }
    }

    async fn store(&self, date: CalendarDate, entry: CacheEntry) {
        let cache = self.cache.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || cache.put(date, &entry)).await {
            warn!("{}", CacheError::Task(e.to_string()));
        }
    }

    /// Fetches `slot`, normalizes the row and writes it back if it is newer
    /// than `cached`.
    ///
    /// Shared by resolution and prefetch.
    pub async fn fetch_and_store(
        &self,
        date: CalendarDate,
        slot: ScheduledSlot,
        cached: Option<&CacheEntry>,
    ) -> FetchOutcome {
        let fetch = match self.source.fetch_by_slot(slot).await {
            Ok(fetch) => fetch,
            Err(e) => return FetchOutcome::Failed(e),
        };

        let Some(row) = fetch.row else {
            return FetchOutcome::NotFound;
        };

        let version = fetch.version_token;
        if !is_newer_than_cached(cached, version.as_deref()) {
            return FetchOutcome::UpToDate;
        }

        let content = ReadingContent::from_row(&row);
        self.store(date, CacheEntry::new(content.clone(), version.clone()))
            .await;
        info!("Stored reading {} (version {:?})", content.id, version);

        FetchOutcome::Stored(content)
    }
}
