//! Background prefetch of upcoming readings.
//!
//! After each date change the caller fires a prefetch over a window of dates
//! starting at the shown date. Each date is attempted at most once per
//! [`PrefetchLedger`]; dates already cached are skipped without a remote call.
//! Prefetch is best-effort: failures are logged and never surface.

use crate::calendar::{format_local_key, to_scheduled_slot, CalendarDate};
use crate::resolver::{FetchOutcome, Resolver};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

/// The set of local dates already attempted in this process.
///
/// It is owned by whoever composes the subsystem and shared by cloning, so a
/// fresh ledger gives a fresh process-lifetime view (useful in tests).
#[derive(Debug, Clone, Default)]
pub struct PrefetchLedger {
    attempted: Arc<Mutex<HashSet<String>>>,
}

impl PrefetchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as attempted. Returns `false` if it already was.
    pub fn try_mark(&self, key: &str) -> bool {
        let mut attempted = self.attempted.lock().unwrap_or_else(|e| e.into_inner());
        attempted.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        let attempted = self.attempted.lock().unwrap_or_else(|e| e.into_inner());
        attempted.contains(key)
    }

    pub fn len(&self) -> usize {
        let attempted = self.attempted.lock().unwrap_or_else(|e| e.into_inner());
        attempted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every attempt.
    pub fn reset(&self) {
        let mut attempted = self.attempted.lock().unwrap_or_else(|e| e.into_inner());
        attempted.clear();
    }
}

/// Report of a completed prefetch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    /// Dates in the window
    pub total: usize,
    /// Dates skipped because an earlier pass already tried them
    pub already_attempted: usize,
    /// Dates skipped because the cache already had them
    pub already_cached: usize,
    /// Dates fetched and stored
    pub stored: usize,
    /// Dates with no content on the remote
    pub absent: usize,
    /// Dates whose fetch failed
    pub failed: usize,
}

/// Walks a window of dates and fills the cache ahead of need.
#[derive(Clone)]
pub struct Prefetcher {
    resolver: Resolver,
    ledger: PrefetchLedger,
}

impl Prefetcher {
    pub fn new(resolver: Resolver, ledger: PrefetchLedger) -> Self {
        Prefetcher { resolver, ledger }
    }

    pub fn ledger(&self) -> &PrefetchLedger {
        &self.ledger
    }

    /// Prefetches `window_days` dates starting at `anchor` (the anchor included).
    ///
    /// Dates are handled one after another. Never fails; the report says what
    /// happened.
    pub async fn prefetch_window(&self, anchor: CalendarDate, window_days: u32) -> PrefetchReport {
        let span = info_span!("prefetch", anchor = %format_local_key(anchor), window_days);

        async move {
            let mut report = PrefetchReport::default();

            for offset in 0..window_days {
                let date = match anchor.add_days(offset) {
                    Ok(date) => date,
                    Err(e) => {
                        warn!("Stopping prefetch: {}", e);
                        break;
                    }
                };
                report.total += 1;

                let key = format_local_key(date);
                if !self.ledger.try_mark(&key) {
                    debug!("Already attempted {}", key);
                    report.already_attempted += 1;
                    continue;
                }

                if self.resolver.cached(date).await.is_some() {
                    debug!("Already cached {}", key);
                    report.already_cached += 1;
                    continue;
                }

                let slot = to_scheduled_slot(date);
                match self.resolver.fetch_and_store(date, slot, None).await {
                    FetchOutcome::Stored(_) | FetchOutcome::UpToDate => report.stored += 1,
                    FetchOutcome::NotFound => {
                        debug!("No reading for {} (slot {})", key, slot);
                        report.absent += 1;
                    }
                    FetchOutcome::Failed(e) => {
                        warn!("Prefetch of {} failed: {}", key, e);
                        report.failed += 1;
                    }
                }
            }

            info!(
                "Prefetch complete: {} stored, {} cached, {} skipped, {} absent, {} failed",
                report.stored,
                report.already_cached,
                report.already_attempted,
                report.absent,
                report.failed
            );
            report
        }
        .instrument(span)
        .await
    }

    /// Starts [`Prefetcher::prefetch_window`] on a background task.
    ///
    /// The handle may be dropped; the task keeps running.
    pub fn spawn_window(&self, anchor: CalendarDate, window_days: u32) -> JoinHandle<PrefetchReport> {
        let prefetcher = self.clone();
        tokio::spawn(async move { prefetcher.prefetch_window(anchor, window_days).await })
    }
}
