use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use reelquest_core::error::ApiError;
use reelquest_core::types::MediaKind;
use reelquest_enrich::enrich::{EnrichedDetail, EnrichedPage};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_media))
        .route("/media/{kind}/{id}", get(media_detail))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Media search and detail
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
    #[serde(default = "default_page")]
    page: u32,
    /// Whether library-availability enrichment is wanted for this search.
    #[serde(default = "default_availability")]
    availability: bool,
}

fn default_page() -> u32 {
    1
}

fn default_availability() -> bool {
    true
}

async fn search_media(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<EnrichedPage>, AppError> {
    let page = state
        .enricher
        .search(&params.query, params.page, params.availability)
        .await?;
    Ok(Json(page))
}

async fn media_detail(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<EnrichedDetail>, AppError> {
    let kind: MediaKind = kind.parse().map_err(ApiError::BadRequest)?;

    let detail = state.enricher.detail(kind, id).await?;
    Ok(Json(detail))
}
