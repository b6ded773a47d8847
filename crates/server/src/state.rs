use std::sync::Arc;

use sqlx::SqlitePool;

use reelquest_enrich::enrich::Enricher;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub enricher: Arc<Enricher>,
}
