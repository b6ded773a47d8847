//! TMDB (The Movie Database) catalog client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use std::time::Duration;

use tracing::debug;

use reelquest_core::types::MediaKind;

use crate::EnrichError;
use crate::catalog::{CatalogDetail, CatalogItem, CatalogSource, PersonInfo, SearchPage, VideoRef};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Poster size for list results; detail pages get the full-size images.
const LIST_POSTER_SIZE: &str = "w342";
const LIST_BACKDROP_SIZE: &str = "w300";
const DETAIL_IMAGE_SIZE: &str = "original";

/// Build an absolute image URL from a provider-relative path.
/// Empty path yields an empty string; no network, no failure mode.
pub fn image_url(path: &str, size: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    format!("{IMAGE_BASE}/{size}{path}")
}

pub struct TmdbClient {
    api_key: String,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, EnrichError> {
        let mut all_params = vec![("api_key", self.api_key.as_str())];
        all_params.extend_from_slice(params);

        let url = format!("{BASE_URL}{path}");
        debug!(url = %url, "TMDB request");

        let resp = self
            .client
            .get(&url)
            .query(&all_params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| EnrichError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichError::NotFound);
        }

        if !resp.status().is_success() {
            return Err(EnrichError::Provider(format!(
                "TMDB returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| EnrichError::Provider(format!("parse JSON: {e}")))
    }
}

#[async_trait::async_trait]
impl CatalogSource for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, EnrichError> {
        if query.is_empty() {
            return Err(EnrichError::InvalidInput("query must not be empty".into()));
        }

        let page_str = page.max(1).to_string();
        let data = self
            .get_json("/search/multi", &[("query", query), ("page", &page_str)])
            .await?;

        Ok(parse_search_page(&data))
    }

    async fn movie_detail(&self, id: i64) -> Result<CatalogDetail, EnrichError> {
        let data = self
            .get_json(
                &format!("/movie/{id}"),
                &[("append_to_response", "credits,videos,external_ids")],
            )
            .await?;

        Ok(parse_movie_detail(&data))
    }

    async fn series_detail(&self, id: i64) -> Result<CatalogDetail, EnrichError> {
        let data = self
            .get_json(
                &format!("/tv/{id}"),
                &[("append_to_response", "credits,videos,external_ids")],
            )
            .await?;

        Ok(parse_series_detail(&data))
    }
}

fn parse_search_page(data: &serde_json::Value) -> SearchPage {
    let results = data["results"].as_array().cloned().unwrap_or_default();

    SearchPage {
        page: data["page"].as_i64().unwrap_or(1),
        total_pages: data["total_pages"].as_i64().unwrap_or(0),
        total_results: data["total_results"].as_i64().unwrap_or(0),
        results: results.iter().filter_map(parse_search_item).collect(),
    }
}

/// Parse one multi-search entry. Returns `None` for non-title entries
/// (TMDB mixes people into multi-search results).
fn parse_search_item(r: &serde_json::Value) -> Option<CatalogItem> {
    let kind = match r["media_type"].as_str() {
        Some("movie") => MediaKind::Movie,
        Some("tv") => MediaKind::Series,
        _ => return None,
    };

    let (title_field, date_field) = match kind {
        MediaKind::Movie => ("title", "release_date"),
        MediaKind::Series => ("name", "first_air_date"),
    };

    let poster_path = r["poster_path"].as_str().map(|s| s.to_string());
    let backdrop_path = r["backdrop_path"].as_str().map(|s| s.to_string());

    Some(CatalogItem {
        id: r["id"].as_i64().unwrap_or(0),
        kind,
        title: r[title_field].as_str().unwrap_or("Unknown").to_string(),
        release_date: r[date_field]
            .as_str()
            .filter(|d| !d.is_empty())
            .map(|s| s.to_string()),
        overview: r["overview"].as_str().map(|s| s.to_string()),
        poster_url: poster_path.as_deref().map(|p| image_url(p, LIST_POSTER_SIZE)),
        backdrop_url: backdrop_path
            .as_deref()
            .map(|p| image_url(p, LIST_BACKDROP_SIZE)),
        poster_path,
        backdrop_path,
        vote_average: r["vote_average"].as_f64().unwrap_or(0.0),
        vote_count: r["vote_count"].as_i64().unwrap_or(0),
        popularity: r["popularity"].as_f64().unwrap_or(0.0),
        genre_ids: r["genre_ids"]
            .as_array()
            .map(|ids| ids.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default(),
    })
}

fn parse_detail_item(data: &serde_json::Value, kind: MediaKind) -> CatalogItem {
    let (title_field, date_field) = match kind {
        MediaKind::Movie => ("title", "release_date"),
        MediaKind::Series => ("name", "first_air_date"),
    };

    let poster_path = data["poster_path"].as_str().map(|s| s.to_string());
    let backdrop_path = data["backdrop_path"].as_str().map(|s| s.to_string());

    CatalogItem {
        id: data["id"].as_i64().unwrap_or(0),
        kind,
        title: data[title_field].as_str().unwrap_or("Unknown").to_string(),
        release_date: data[date_field]
            .as_str()
            .filter(|d| !d.is_empty())
            .map(|s| s.to_string()),
        overview: data["overview"].as_str().map(|s| s.to_string()),
        poster_url: poster_path
            .as_deref()
            .map(|p| image_url(p, DETAIL_IMAGE_SIZE)),
        backdrop_url: backdrop_path
            .as_deref()
            .map(|p| image_url(p, DETAIL_IMAGE_SIZE)),
        poster_path,
        backdrop_path,
        vote_average: data["vote_average"].as_f64().unwrap_or(0.0),
        vote_count: data["vote_count"].as_i64().unwrap_or(0),
        popularity: data["popularity"].as_f64().unwrap_or(0.0),
        genre_ids: data["genres"]
            .as_array()
            .map(|gs| gs.iter().filter_map(|g| g["id"].as_i64()).collect())
            .unwrap_or_default(),
    }
}

fn parse_movie_detail(data: &serde_json::Value) -> CatalogDetail {
    CatalogDetail {
        item: parse_detail_item(data, MediaKind::Movie),
        runtime_minutes: data["runtime"].as_i64(),
        number_of_seasons: None,
        number_of_episodes: None,
        genres: extract_names(&data["genres"]),
        studios: extract_names(&data["production_companies"]),
        cast: extract_credits(data.get("credits")),
        videos: extract_videos(data.get("videos")),
        imdb_id: data["external_ids"]["imdb_id"]
            .as_str()
            .unwrap_or("")
            .to_string(),
    }
}

fn parse_series_detail(data: &serde_json::Value) -> CatalogDetail {
    let mut studios = extract_names(&data["networks"]);
    studios.extend(extract_names(&data["production_companies"]));

    CatalogDetail {
        item: parse_detail_item(data, MediaKind::Series),
        runtime_minutes: data["episode_run_time"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(|v| v.as_i64()),
        number_of_seasons: data["number_of_seasons"].as_i64(),
        number_of_episodes: data["number_of_episodes"].as_i64(),
        genres: extract_names(&data["genres"]),
        studios,
        cast: extract_credits(data.get("credits")),
        videos: extract_videos(data.get("videos")),
        imdb_id: data["external_ids"]["imdb_id"]
            .as_str()
            .unwrap_or("")
            .to_string(),
    }
}

fn extract_names(list: &serde_json::Value) -> Vec<String> {
    list.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e["name"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn extract_credits(credits: Option<&serde_json::Value>) -> Vec<PersonInfo> {
    let mut people = Vec::new();

    if let Some(credits) = credits {
        // Cast
        if let Some(cast) = credits["cast"].as_array() {
            for person in cast.iter().take(20) {
                people.push(PersonInfo {
                    name: person["name"].as_str().unwrap_or("").to_string(),
                    role: "Actor".to_string(),
                    character: person["character"].as_str().map(|s| s.to_string()),
                    thumb_url: person["profile_path"]
                        .as_str()
                        .map(|p| image_url(p, "w185")),
                });
            }
        }

        // Crew (directors only)
        if let Some(crew) = credits["crew"].as_array() {
            for person in crew {
                if person["job"].as_str() == Some("Director") {
                    people.push(PersonInfo {
                        name: person["name"].as_str().unwrap_or("").to_string(),
                        role: "Director".to_string(),
                        character: None,
                        thumb_url: person["profile_path"]
                            .as_str()
                            .map(|p| image_url(p, "w185")),
                    });
                }
            }
        }
    }

    people
}

fn extract_videos(videos: Option<&serde_json::Value>) -> Vec<VideoRef> {
    videos
        .and_then(|v| v["results"].as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| {
                    let key = e["key"].as_str()?;
                    Some(VideoRef {
                        name: e["name"].as_str().unwrap_or("").to_string(),
                        site: e["site"].as_str().unwrap_or("").to_string(),
                        key: key.to_string(),
                        kind: e["type"].as_str().unwrap_or("").to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_empty_path_is_empty() {
        assert_eq!(image_url("", "w342"), "");
        assert_eq!(image_url("", "original"), "");
    }

    #[test]
    fn image_url_joins_base_size_and_path() {
        assert_eq!(
            image_url("/poster.jpg", "w342"),
            "https://image.tmdb.org/t/p/w342/poster.jpg"
        );
    }

    #[test]
    fn parse_search_page_maps_movies_and_series() {
        let json = serde_json::json!({
            "page": 1,
            "total_pages": 3,
            "total_results": 42,
            "results": [
                {
                    "media_type": "movie",
                    "id": 603,
                    "title": "The Matrix",
                    "release_date": "1999-03-31",
                    "overview": "A computer hacker...",
                    "poster_path": "/matrix.jpg",
                    "backdrop_path": "/matrix-bd.jpg",
                    "vote_average": 8.2,
                    "vote_count": 2,
                    "popularity": 85.1,
                    "genre_ids": [28, 878]
                },
                {
                    "media_type": "tv",
                    "id": 1396,
                    "name": "Breaking Bad",
                    "first_air_date": "2008-01-20",
                    "overview": "A chemistry teacher...",
                    "poster_path": "/bb.jpg",
                    "vote_average": 8.9,
                    "vote_count": 1,
                    "popularity": 120.5,
                    "genre_ids": [18]
                },
                {
                    "media_type": "person",
                    "id": 6384,
                    "name": "Keanu Reeves"
                }
            ]
        });

        let page = parse_search_page(&json);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_results, 42);
        // Person entries are dropped; titles keep provider order
        assert_eq!(page.results.len(), 2);

        let movie = &page.results[0];
        assert_eq!(movie.id, 603);
        assert_eq!(movie.kind, MediaKind::Movie);
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.release_date.as_deref(), Some("1999-03-31"));
        assert_eq!(
            movie.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w342/matrix.jpg")
        );
        assert_eq!(movie.genre_ids, vec![28, 878]);

        let series = &page.results[1];
        assert_eq!(series.kind, MediaKind::Series);
        assert_eq!(series.title, "Breaking Bad");
        assert_eq!(series.release_date.as_deref(), Some("2008-01-20"));
    }

    #[test]
    fn parse_search_item_tolerates_missing_fields() {
        let json = serde_json::json!({ "media_type": "movie", "id": 7 });
        let item = parse_search_item(&json).unwrap();
        assert_eq!(item.title, "Unknown");
        assert!(item.release_date.is_none());
        assert!(item.poster_url.is_none());
        assert_eq!(item.vote_count, 0);
        assert!(item.genre_ids.is_empty());
    }

    #[test]
    fn parse_movie_detail_from_json() {
        let json = serde_json::json!({
            "id": 603,
            "title": "The Matrix",
            "release_date": "1999-03-31",
            "overview": "A computer hacker learns the truth.",
            "runtime": 136,
            "vote_average": 8.2,
            "vote_count": 24000,
            "popularity": 85.1,
            "poster_path": "/matrix.jpg",
            "backdrop_path": "/matrix-bd.jpg",
            "genres": [
                { "id": 28, "name": "Action" },
                { "id": 878, "name": "Science Fiction" }
            ],
            "production_companies": [
                { "name": "Warner Bros." }
            ],
            "credits": {
                "cast": [
                    { "name": "Keanu Reeves", "character": "Neo", "profile_path": "/keanu.jpg" }
                ],
                "crew": [
                    { "name": "Lana Wachowski", "job": "Director" },
                    { "name": "John Gaeta", "job": "Visual Effects Supervisor" }
                ]
            },
            "videos": {
                "results": [
                    { "name": "Official Trailer", "site": "YouTube", "key": "vKQi3bBA1y8", "type": "Trailer" }
                ]
            },
            "external_ids": { "imdb_id": "tt0133093" }
        });

        let detail = parse_movie_detail(&json);
        assert_eq!(detail.item.title, "The Matrix");
        assert_eq!(detail.runtime_minutes, Some(136));
        assert_eq!(detail.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(detail.item.genre_ids, vec![28, 878]);
        assert_eq!(detail.studios, vec!["Warner Bros."]);
        assert_eq!(detail.imdb_id, "tt0133093");
        assert_eq!(
            detail.item.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/matrix.jpg")
        );

        // Directors appended after cast; other crew skipped
        assert_eq!(detail.cast.len(), 2);
        assert_eq!(detail.cast[0].name, "Keanu Reeves");
        assert_eq!(detail.cast[0].role, "Actor");
        assert_eq!(detail.cast[1].name, "Lana Wachowski");
        assert_eq!(detail.cast[1].role, "Director");

        assert_eq!(detail.videos.len(), 1);
        assert_eq!(detail.videos[0].key, "vKQi3bBA1y8");
        assert_eq!(detail.videos[0].kind, "Trailer");
    }

    #[test]
    fn parse_series_detail_from_json() {
        let json = serde_json::json!({
            "id": 1396,
            "name": "Breaking Bad",
            "first_air_date": "2008-01-20",
            "overview": "A chemistry teacher turns to crime.",
            "episode_run_time": [47],
            "number_of_seasons": 5,
            "number_of_episodes": 62,
            "vote_average": 8.9,
            "networks": [ { "name": "AMC" } ],
            "production_companies": [ { "name": "Sony Pictures Television" } ],
            "genres": [ { "id": 18, "name": "Drama" } ],
            "external_ids": { "imdb_id": "tt0903747" }
        });

        let detail = parse_series_detail(&json);
        assert_eq!(detail.item.kind, MediaKind::Series);
        assert_eq!(detail.item.title, "Breaking Bad");
        assert_eq!(detail.runtime_minutes, Some(47));
        assert_eq!(detail.number_of_seasons, Some(5));
        assert_eq!(detail.number_of_episodes, Some(62));
        assert_eq!(detail.studios, vec!["AMC", "Sony Pictures Television"]);
        assert_eq!(detail.imdb_id, "tt0903747");
        assert!(detail.cast.is_empty());
    }

    #[test]
    fn parse_detail_missing_external_ids_yields_empty_key() {
        let json = serde_json::json!({ "id": 1, "title": "Obscure" });
        let detail = parse_movie_detail(&json);
        assert_eq!(detail.imdb_id, "");
    }
}
