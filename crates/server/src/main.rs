use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reelquest_enrich::enrich::Enricher;
use reelquest_enrich::library::{AvailabilityChecker, DisabledAvailability, MediaServerClient};
use reelquest_enrich::ratings::{OmdbClient, RatingsCache};
use reelquest_enrich::tmdb::TmdbClient;
use reelquest_server::routes::build_router;
use reelquest_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // DB path: use REELQUEST_DB env or default
    let db_path = std::env::var("REELQUEST_DB").unwrap_or_else(|_| "reelquest.db".to_string());
    info!(db_path = %db_path, "connecting to database");

    let pool = reelquest_db::connect(&db_path)
        .await
        .context("failed to connect to database")?;

    reelquest_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    // Catalog provider is mandatory
    let tmdb_key =
        std::env::var("REELQUEST_TMDB_API_KEY").context("REELQUEST_TMDB_API_KEY must be set")?;
    let catalog = Arc::new(TmdbClient::new(tmdb_key));

    // Media server is optional: both URL and token must be present
    let availability: Arc<dyn AvailabilityChecker> = match (
        std::env::var("REELQUEST_MEDIA_SERVER_URL"),
        std::env::var("REELQUEST_MEDIA_SERVER_TOKEN"),
    ) {
        (Ok(url), Ok(token)) if !url.is_empty() && !token.is_empty() => {
            info!(url = %url, "availability checks enabled");
            Arc::new(MediaServerClient::new(url, token))
        }
        _ => {
            info!("no media server configured; availability checks disabled");
            Arc::new(DisabledAvailability)
        }
    };

    // Ratings provider is optional
    let ratings = match std::env::var("REELQUEST_OMDB_API_KEY") {
        Ok(key) if !key.is_empty() => {
            info!("ratings enrichment enabled");
            Some(RatingsCache::new(pool.clone(), Arc::new(OmdbClient::new(key))))
        }
        _ => {
            info!("no OMDb key configured; ratings enrichment disabled");
            None
        }
    };

    let enricher = Arc::new(Enricher::new(catalog, availability, ratings));

    let state = AppState {
        db: pool,
        enricher,
    };

    let bind = std::env::var("REELQUEST_BIND").unwrap_or_else(|_| "0.0.0.0:8585".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %bind, "reelquest-server listening");

    axum::serve(listener, build_router(state))
        .await
        .context("server error")?;

    Ok(())
}
