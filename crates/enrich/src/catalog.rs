use reelquest_core::types::MediaKind;

use crate::EnrichError;

/// A catalog provider that can search and fetch per-title detail.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    /// Multi-type search (movies and series mixed), one catalog page at a time.
    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, EnrichError>;

    /// Full detail for a movie by catalog id.
    async fn movie_detail(&self, id: i64) -> Result<CatalogDetail, EnrichError>;

    /// Full detail for a series by catalog id.
    async fn series_detail(&self, id: i64) -> Result<CatalogDetail, EnrichError>;
}

/// One page of catalog search results, in the provider's original order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchPage {
    pub page: i64,
    pub total_pages: i64,
    pub total_results: i64,
    pub results: Vec<CatalogItem>,
}

/// A search-level catalog entry. Never persisted; produced fresh per call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub kind: MediaKind,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub genre_ids: Vec<i64>,
}

/// Detail-level catalog payload: everything in [`CatalogItem`] plus runtime,
/// season counts, production metadata, credits, videos and the external
/// cross-reference id block.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CatalogDetail {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub runtime_minutes: Option<i64>,
    pub number_of_seasons: Option<i64>,
    pub number_of_episodes: Option<i64>,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub cast: Vec<PersonInfo>,
    pub videos: Vec<VideoRef>,
    /// IMDb cross-reference key; empty when the provider doesn't know it.
    pub imdb_id: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersonInfo {
    pub name: String,
    pub role: String, // "Actor", "Director", etc.
    pub character: Option<String>,
    pub thumb_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoRef {
    pub name: String,
    pub site: String,
    pub key: String,
    pub kind: String, // "Trailer", "Teaser", etc.
}
