//! Personal media-server availability checks.
//!
//! Asks the user's media server whether a title is already in the library.
//! The whole component is optional: without a server URL + token the
//! orchestrator runs with [`DisabledAvailability`], which reports nothing
//! as available instead of erroring.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use reelquest_core::types::MediaKind;

use crate::EnrichError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Checks whether a title already exists in the local library.
#[async_trait::async_trait]
pub trait AvailabilityChecker: Send + Sync {
    /// `year == 0` is a wildcard meaning "match any year" (caller doesn't
    /// know the release year).
    async fn exists(&self, title: &str, year: i64, kind: MediaKind) -> Result<bool, EnrichError>;
}

/// Null object used when no media server is configured.
pub struct DisabledAvailability;

#[async_trait::async_trait]
impl AvailabilityChecker for DisabledAvailability {
    async fn exists(&self, _title: &str, _year: i64, _kind: MediaKind) -> Result<bool, EnrichError> {
        Ok(false)
    }
}

/// One entry from the media server's library search.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: i64,
    #[serde(default)]
    pub kind: String,
}

/// Media-server client speaking the flat library-search API.
pub struct MediaServerClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl MediaServerClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn search_library(&self, query: &str) -> Result<Vec<LibraryEntry>, EnrichError> {
        let url = format!("{}/library/search", self.base_url);
        debug!(url = %url, query, "media server library search");

        let resp = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .header("X-Api-Token", &self.token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| EnrichError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(EnrichError::Provider(format!(
                "media server returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| EnrichError::Provider(format!("parse JSON: {e}")))
    }
}

#[async_trait::async_trait]
impl AvailabilityChecker for MediaServerClient {
    async fn exists(&self, title: &str, year: i64, kind: MediaKind) -> Result<bool, EnrichError> {
        let entries = self.search_library(title).await?;
        Ok(entries.iter().any(|e| entry_matches(e, title, year, kind)))
    }
}

/// Tolerant equality match: case-insensitive title and kind, with `year == 0`
/// matching any year. First match wins in the caller's linear scan.
fn entry_matches(entry: &LibraryEntry, title: &str, year: i64, kind: MediaKind) -> bool {
    entry.title.eq_ignore_ascii_case(title)
        && (year == 0 || entry.year == year)
        && entry.kind.eq_ignore_ascii_case(kind.as_str())
}
