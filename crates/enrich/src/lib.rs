//! Media-enrichment pipeline.
//!
//! Composes three independently-fallible providers into one response:
//! the catalog provider (mandatory), the personal media-server availability
//! check (optional), and the ratings provider behind a persistent cache
//! (optional). See [`enrich::Enricher`] for the composition rules.

pub mod catalog;
pub mod enrich;
pub mod library;
pub mod ratings;
pub mod tmdb;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("not found")]
    NotFound,
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}
