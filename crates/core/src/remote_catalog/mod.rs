//! Remote movie catalog integration.
//!
//! The coordinator only talks to the catalog through [`RemoteCatalog`];
//! [`TmdbClient`] is the production implementation.

mod tmdb;
mod types;

pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Operations the browse layer consumes from the remote catalog.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Free-text search.
    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, CatalogError>;

    /// Structured discovery. Only defined fields of the query are transmitted.
    async fn discover(&self, query: &DiscoverQuery) -> Result<ResultPage, CatalogError>;

    /// Trending items of the week.
    async fn trending(&self, page: u32) -> Result<ResultPage, CatalogError>;

    /// Details for a single item.
    async fn details(&self, id: CatalogId) -> Result<CatalogItemDetails, CatalogError>;

    /// The genre catalog.
    async fn genres(&self) -> Result<Vec<Genre>, CatalogError>;
}
