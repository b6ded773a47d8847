//! Ratings provider client and its cache-aside persistent cache.
//!
//! The ratings provider (OMDb-shaped) is the slowest and most rate-limited
//! upstream, so every successful fetch is written to the `ratings_cache`
//! table and served from there on later lookups. Not-found and failed
//! fetches are never cached, so a later retry hits the provider again.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{debug, warn};

use reelquest_db::repo::ratings::{self, RatingsRow};

use crate::EnrichError;

const OMDB_BASE: &str = "https://www.omdbapi.com/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Third-party rating aggregates for one IMDb id. All values are opaque
/// display strings straight from the provider (may be "N/A").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RatingsSnapshot {
    pub imdb_id: String,
    pub imdb_rating: String,
    pub imdb_votes: String,
    pub rotten_tomatoes: String,
    pub metascore: String,
    pub awards: String,
    pub box_office: String,
}

/// External ratings source, hidden behind a trait so the cache can be
/// exercised against fakes.
#[async_trait::async_trait]
pub trait RatingsProvider: Send + Sync {
    /// Fetch ratings for an IMDb id. `Ok(None)` means the provider reported
    /// the id as unknown (its explicit not-found indicator, not an error).
    async fn fetch(&self, imdb_id: &str) -> Result<Option<RatingsSnapshot>, EnrichError>;
}

pub struct OmdbClient {
    api_key: String,
    client: reqwest::Client,
}

impl OmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl RatingsProvider for OmdbClient {
    async fn fetch(&self, imdb_id: &str) -> Result<Option<RatingsSnapshot>, EnrichError> {
        debug!(imdb_id, "OMDb request");

        let resp = self
            .client
            .get(OMDB_BASE)
            .query(&[("i", imdb_id), ("apikey", self.api_key.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| EnrichError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(EnrichError::Provider(format!(
                "OMDb returned {}",
                resp.status()
            )));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| EnrichError::Provider(format!("parse JSON: {e}")))?;

        // OMDb signals "unknown id" in the body, not via HTTP status
        if data["Response"].as_str() == Some("False") {
            return Ok(None);
        }

        Ok(Some(snapshot_from_json(imdb_id, &data)))
    }
}

/// Pull one value out of the provider's `Ratings: [{Source, Value}]` list.
/// Order-independent; `None` when the list is absent or the source missing.
pub fn extract_by_source(data: &serde_json::Value, source: &str) -> Option<String> {
    data["Ratings"]
        .as_array()?
        .iter()
        .find(|r| r["Source"].as_str() == Some(source))
        .and_then(|r| r["Value"].as_str())
        .map(|s| s.to_string())
}

fn str_field(data: &serde_json::Value, key: &str) -> String {
    data[key].as_str().unwrap_or("").to_string()
}

/// Assemble a snapshot from an OMDb success payload. Every field defaults to
/// an empty string when not found anywhere in the response.
pub fn snapshot_from_json(imdb_id: &str, data: &serde_json::Value) -> RatingsSnapshot {
    RatingsSnapshot {
        imdb_id: imdb_id.to_string(),
        imdb_rating: str_field(data, "imdbRating"),
        imdb_votes: str_field(data, "imdbVotes"),
        rotten_tomatoes: extract_by_source(data, "Rotten Tomatoes").unwrap_or_default(),
        // Prefer the named-source list; fall back to the flat Metascore field
        metascore: extract_by_source(data, "Metacritic")
            .unwrap_or_else(|| str_field(data, "Metascore")),
        awards: str_field(data, "Awards"),
        box_office: str_field(data, "BoxOffice"),
    }
}

fn row_to_snapshot(row: RatingsRow) -> RatingsSnapshot {
    RatingsSnapshot {
        imdb_id: row.imdb_id,
        imdb_rating: row.imdb_rating,
        imdb_votes: row.imdb_votes,
        rotten_tomatoes: row.rotten_tomatoes,
        metascore: row.metascore,
        awards: row.awards,
        box_office: row.box_office,
    }
}

fn snapshot_to_row(snap: &RatingsSnapshot) -> RatingsRow {
    RatingsRow {
        imdb_id: snap.imdb_id.clone(),
        imdb_rating: snap.imdb_rating.clone(),
        imdb_votes: snap.imdb_votes.clone(),
        rotten_tomatoes: snap.rotten_tomatoes.clone(),
        metascore: snap.metascore.clone(),
        awards: snap.awards.clone(),
        box_office: snap.box_office.clone(),
    }
}

/// Cache-aside wrapper: store first, provider on miss, write-back on success.
pub struct RatingsCache {
    pool: SqlitePool,
    provider: Arc<dyn RatingsProvider>,
}

impl RatingsCache {
    pub fn new(pool: SqlitePool, provider: Arc<dyn RatingsProvider>) -> Self {
        Self { pool, provider }
    }

    /// Look up ratings for an IMDb id.
    ///
    /// Empty key short-circuits to `None` with no store or network access.
    /// Provider failures are swallowed here (logged, `None`): the cache is an
    /// optional enrichment, never a reason to fail the request. Store read
    /// errors still propagate as `Db`.
    pub async fn get(&self, imdb_id: &str) -> Result<Option<RatingsSnapshot>, EnrichError> {
        if imdb_id.is_empty() {
            return Ok(None);
        }

        if let Some(row) = ratings::get(&self.pool, imdb_id).await? {
            debug!(imdb_id, "ratings cache hit");
            return Ok(Some(row_to_snapshot(row)));
        }

        let snapshot = match self.provider.fetch(imdb_id).await {
            Ok(Some(snap)) => snap,
            Ok(None) => {
                debug!(imdb_id, "ratings provider has no entry");
                return Ok(None);
            }
            Err(e) => {
                warn!(imdb_id, error = %e, "ratings fetch failed; omitting ratings");
                return Ok(None);
            }
        };

        // The snapshot is still returned if the write fails: the cache is a
        // performance optimization, not a correctness requirement.
        if let Err(e) = ratings::insert(&self.pool, &snapshot_to_row(&snapshot)).await {
            warn!(imdb_id, error = %e, "ratings cache write failed");
        }

        Ok(Some(snapshot))
    }
}
