//! Request-time enrichment orchestrator.
//!
//! Composition rules: the catalog call is mandatory and its failure aborts
//! the whole operation. Availability and ratings are additive enrichments;
//! each failure is logged and swallowed, leaving the flag at `false` or the
//! ratings field absent. The underlying catalog fields are never changed or
//! suppressed by a missing enrichment.

use std::sync::Arc;

use tracing::warn;

use reelquest_core::types::MediaKind;

use crate::EnrichError;
use crate::catalog::{CatalogDetail, CatalogItem, CatalogSource};
use crate::library::AvailabilityChecker;
use crate::ratings::{RatingsCache, RatingsSnapshot};

/// A catalog item plus the library-availability flag.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EnrichedItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub available: bool,
}

/// One enriched search page, results in the catalog provider's order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EnrichedPage {
    pub page: i64,
    pub total_pages: i64,
    pub total_results: i64,
    pub results: Vec<EnrichedItem>,
}

/// Detail payload plus availability and (when known) cached ratings.
/// `ratings` is omitted from the serialized response entirely when absent.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EnrichedDetail {
    #[serde(flatten)]
    pub detail: CatalogDetail,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<RatingsSnapshot>,
}

/// Derive a library-match year from a catalog date string: first four
/// characters parsed as an integer, 0 (the any-year wildcard) when absent.
fn release_year(date: Option<&str>) -> i64 {
    date.and_then(|d| d.get(..4))
        .and_then(|y| y.parse().ok())
        .unwrap_or(0)
}

pub struct Enricher {
    catalog: Arc<dyn CatalogSource>,
    availability: Arc<dyn AvailabilityChecker>,
    ratings: Option<RatingsCache>,
}

impl Enricher {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        availability: Arc<dyn AvailabilityChecker>,
        ratings: Option<RatingsCache>,
    ) -> Self {
        Self {
            catalog,
            availability,
            ratings,
        }
    }

    /// Search the catalog and flag each result with library availability.
    ///
    /// Ratings are not fetched on the search path; list results don't carry
    /// the cross-reference key cheaply.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        check_availability: bool,
    ) -> Result<EnrichedPage, EnrichError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EnrichError::InvalidInput("query must not be empty".into()));
        }

        let found = self.catalog.search(query, page).await?;

        let mut results = Vec::with_capacity(found.results.len());
        for item in found.results {
            let available = if check_availability {
                self.check_available(&item).await
            } else {
                false
            };
            results.push(EnrichedItem { item, available });
        }

        Ok(EnrichedPage {
            page: found.page,
            total_pages: found.total_pages,
            total_results: found.total_results,
            results,
        })
    }

    /// Fetch detail for one title and enrich it with availability and
    /// cached ratings.
    pub async fn detail(&self, kind: MediaKind, id: i64) -> Result<EnrichedDetail, EnrichError> {
        let detail = match kind {
            MediaKind::Movie => self.catalog.movie_detail(id).await?,
            MediaKind::Series => self.catalog.series_detail(id).await?,
        };

        let available = self.check_available(&detail.item).await;
        let ratings = self.lookup_ratings(&detail).await;

        Ok(EnrichedDetail {
            detail,
            available,
            ratings,
        })
    }

    /// Per-item availability check; failures never abort the batch.
    async fn check_available(&self, item: &CatalogItem) -> bool {
        let year = release_year(item.release_date.as_deref());
        match self
            .availability
            .exists(&item.title, year, item.kind)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!(title = %item.title, error = %e, "availability check failed; treating as unavailable");
                false
            }
        }
    }

    async fn lookup_ratings(&self, detail: &CatalogDetail) -> Option<RatingsSnapshot> {
        let cache = self.ratings.as_ref()?;
        if detail.imdb_id.is_empty() {
            return None;
        }

        match cache.get(&detail.imdb_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(imdb_id = %detail.imdb_id, error = %e, "ratings lookup failed; omitting ratings");
                None
            }
        }
    }
}
