//! REST client for the hosted readings table.
//!
//! Talks to a PostgREST-style endpoint (`/rest/v1/readings`) using the project's
//! API key. Without an endpoint the client runs in offline mode and every call
//! fails with [`RemoteError::NotConfigured`].

use super::{ReadingSource, RemoteFetch};
use crate::calendar::ScheduledSlot;
use crate::config::Config;
use crate::constants::{READINGS_PATH, REDACTED_PLACEHOLDER};
use crate::errors::RemoteError;
use crate::reading::RemoteRow;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Base URL and credentials of the remote endpoint.
struct Endpoint {
    base_url: String,
    api_key: String,
}

/// Projection used when listing available slots.
#[derive(Debug, Deserialize)]
struct SlotRow {
    day_of_year: u32,
}

/// Client for the hosted readings table.
pub struct RestReadingSource {
    endpoint: Option<Endpoint>,
    client: Client,
}

impl fmt::Debug for RestReadingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestReadingSource")
            .field(
                "base_url",
                &self.endpoint.as_ref().map(|e| e.base_url.as_str()),
            )
            .field(
                "api_key",
                &self.endpoint.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .finish()
    }
}

impl RestReadingSource {
    /// Creates a client for `base_url` (e.g. "https://project.supabase.co").
    ///
    /// `timeout` applies to each request as a whole.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Transport)?;

        Ok(Self {
            endpoint: Some(Endpoint {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                api_key: api_key.into(),
            }),
            client,
        })
    }

    /// A client with no endpoint; every call fails with `NotConfigured`.
    pub fn offline() -> Self {
        Self {
            endpoint: None,
            client: Client::new(),
        }
    }

    /// Builds the client described by the configuration, falling back to
    /// offline mode when no endpoint is configured.
    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        match (&config.api_url, &config.api_key) {
            (Some(url), Some(key)) => Self::new(url.clone(), key.clone(), config.request_timeout),
            _ => {
                warn!("Reading source not configured; running in offline mode");
                Ok(Self::offline())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn get(&self, query: &[(&str, String)]) -> Result<Response, RemoteError> {
        let endpoint = self.endpoint.as_ref().ok_or(RemoteError::NotConfigured)?;
        let url = format!("{}{}", endpoint.base_url, READINGS_PATH);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("apikey", &endpoint.api_key)
            .bearer_auth(&endpoint.api_key)
            .send()
            .await
            .map_err(RemoteError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl ReadingSource for RestReadingSource {
    async fn fetch_by_slot(&self, slot: ScheduledSlot) -> Result<RemoteFetch, RemoteError> {
        debug!("Fetching reading for slot {}", slot);

        let response = self
            .get(&[
                ("select", "*".to_string()),
                ("day_of_year", format!("eq.{}", slot)),
                ("limit", "1".to_string()),
            ])
            .await?;

        let rows: Vec<RemoteRow> = response.json().await.map_err(|e| {
            RemoteError::InvalidResponse(format!("Failed to parse reading rows: {}", e))
        })?;

        let fetch = RemoteFetch::from_row(rows.into_iter().next());
        if let Some(row) = &fetch.row {
            if !row.is_for_slot(slot.get()) {
                warn!(
                    "Row {} for slot {} is filed under day {:?}",
                    row.id, slot, row.day_of_year
                );
            }
        }
        debug!(
            "Slot {}: row {}, version {:?}",
            slot,
            if fetch.row.is_some() { "found" } else { "absent" },
            fetch.version_token
        );
        Ok(fetch)
    }

    async fn available_slots(&self) -> Result<Vec<ScheduledSlot>, RemoteError> {
        debug!("Listing available slots");

        let response = self
            .get(&[
                ("select", "day_of_year".to_string()),
                ("order", "day_of_year.asc".to_string()),
            ])
            .await?;

        let rows: Vec<SlotRow> = response.json().await.map_err(|e| {
            RemoteError::InvalidResponse(format!("Failed to parse slot list: {}", e))
        })?;

        let slots = rows
            .into_iter()
            .filter_map(|row| match ScheduledSlot::new(row.day_of_year) {
                Ok(slot) => Some(slot),
                Err(e) => {
                    warn!("Ignoring remote row: {}", e);
                    None
                }
            })
            .collect();
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_source_reports_not_configured() {
        let source = RestReadingSource::offline();
        assert!(!source.is_configured());

        let slot = ScheduledSlot::new(1).unwrap();
        assert!(matches!(
            source.fetch_by_slot(slot).await,
            Err(RemoteError::NotConfigured)
        ));
        assert!(matches!(
            source.available_slots().await,
            Err(RemoteError::NotConfigured)
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let source =
            RestReadingSource::new("https://example.test/", "secret-key", Duration::from_secs(1))
                .unwrap();

        let debug_output = format!("{:?}", source);
        assert!(debug_output.contains("https://example.test"));
        assert!(debug_output.contains(REDACTED_PLACEHOLDER));
        assert!(!debug_output.contains("secret-key"));
    }
}
