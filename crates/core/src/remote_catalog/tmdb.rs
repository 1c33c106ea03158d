//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{
    CatalogId, CatalogItem, CatalogItemDetails, DiscoverQuery, Genre, GenreId, ResultPage,
};
use super::{CatalogError, RemoteCatalog};
use crate::metrics;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters/backdrops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_base_url: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        if config.api_key.is_empty() {
            return Err(CatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let image_base_url = config
            .image_base_url
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a full image URL, e.g. `image_url("w500", "/poster.jpg")`.
    pub fn image_url(&self, size: &str, path: &str) -> String {
        format!("{}/{}{}", self.image_base_url, size, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", &self.api_key)])
    }

    /// Send a request, map status codes to errors and decode the body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        not_found: impl FnOnce() -> String,
    ) -> Result<T, CatalogError> {
        let start = Instant::now();
        let result = Self::execute(request, not_found).await;

        metrics::CATALOG_REQUEST_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        metrics::CATALOG_REQUESTS
            .with_label_values(&[operation, if result.is_ok() { "success" } else { "error" }])
            .inc();

        result
    }

    async fn execute<T: DeserializeOwned>(
        request: RequestBuilder,
        not_found: impl FnOnce() -> String,
    ) -> Result<T, CatalogError> {
        let response = request.send().await?;

        let status = response.status();
        if status == 401 {
            return Err(CatalogError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 404 {
            return Err(CatalogError::NotFound(not_found()));
        }
        if status == 429 {
            return Err(CatalogError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl RemoteCatalog for TmdbClient {
    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, CatalogError> {
        debug!("TMDB movie search: query='{}', page={}", query, page);

        let request = self.get("/search/movie").query(&[
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ]);

        let response: TmdbPageResponse = self
            .fetch("search", request, || format!("search '{}'", query))
            .await?;
        Ok(response.into())
    }

    async fn discover(&self, query: &DiscoverQuery) -> Result<ResultPage, CatalogError> {
        debug!(
            "TMDB discover: page={}, genre={:?}, year={:?}, min_rating={:?}",
            query.page, query.genre, query.year, query.min_rating
        );

        let request = self.get("/discover/movie").query(&query.params());

        let response: TmdbPageResponse = self
            .fetch("discover", request, || "discover".to_string())
            .await?;
        Ok(response.into())
    }

    async fn trending(&self, page: u32) -> Result<ResultPage, CatalogError> {
        debug!("TMDB trending: page={}", page);

        let request = self
            .get("/trending/movie/week")
            .query(&[("page", page.to_string())]);

        let response: TmdbPageResponse = self
            .fetch("trending", request, || "trending".to_string())
            .await?;
        Ok(response.into())
    }

    async fn details(&self, id: CatalogId) -> Result<CatalogItemDetails, CatalogError> {
        debug!("TMDB get movie: id={}", id);

        let request = self.get(&format!("/movie/{}", id));

        let details: TmdbMovieDetails = self
            .fetch("details", request, || format!("Movie ID {}", id))
            .await?;
        Ok(details.into())
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        debug!("TMDB genre list");

        let request = self.get("/genre/movie/list");

        let response: TmdbGenreList = self
            .fetch("genres", request, || "genre list".to_string())
            .await?;
        Ok(response
            .genres
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: g.name,
            })
            .collect())
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbPageResponse {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    results: Vec<TmdbMovieResult>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u32,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
    #[serde(default)]
    genre_ids: Vec<GenreId>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: u32,
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    runtime: Option<u32>,
    overview: Option<String>,
    tagline: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
    imdb_id: Option<String>,
    homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    id: GenreId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbGenreList {
    #[serde(default)]
    genres: Vec<TmdbGenre>,
}

// ============================================================================
// Conversions
// ============================================================================

/// TMDB dates are sometimes sent as empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<TmdbMovieResult> for CatalogItem {
    fn from(r: TmdbMovieResult) -> Self {
        Self {
            id: r.id,
            title: r.title,
            poster_path: r.poster_path,
            backdrop_path: r.backdrop_path,
            release_date: non_empty(r.release_date),
            vote_average: r.vote_average.unwrap_or_default(),
            overview: non_empty(r.overview),
            genre_ids: r.genre_ids,
        }
    }
}

impl From<TmdbPageResponse> for ResultPage {
    fn from(r: TmdbPageResponse) -> Self {
        Self {
            items: r.results.into_iter().map(CatalogItem::from).collect(),
            page: r.page,
            total_pages: r.total_pages,
            total_results: r.total_results,
        }
    }
}

impl From<TmdbMovieDetails> for CatalogItemDetails {
    fn from(d: TmdbMovieDetails) -> Self {
        Self {
            id: d.id,
            title: d.title,
            original_title: d.original_title,
            release_date: non_empty(d.release_date),
            runtime_minutes: d.runtime,
            overview: non_empty(d.overview),
            tagline: non_empty(d.tagline),
            poster_path: d.poster_path,
            backdrop_path: d.backdrop_path,
            genres: d
                .genres
                .into_iter()
                .map(|g| Genre {
                    id: g.id,
                    name: g.name,
                })
                .collect(),
            vote_average: d.vote_average.unwrap_or_default(),
            vote_count: d.vote_count.unwrap_or_default(),
            imdb_id: non_empty(d.imdb_id),
            homepage: non_empty(d.homepage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> TmdbConfig {
        TmdbConfig {
            api_key: api_key.to_string(),
            base_url: None,
            image_base_url: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let result = TmdbClient::new(config(""));
        assert!(matches!(result, Err(CatalogError::NotConfigured(_))));
    }

    #[test]
    fn test_image_url() {
        let mut cfg = config("key");
        cfg.image_base_url = Some("https://img.example/t/p/".to_string());
        let client = TmdbClient::new(cfg).unwrap();
        assert_eq!(
            client.image_url("w500", "/poster.jpg"),
            "https://img.example/t/p/w500/poster.jpg"
        );
    }

    #[test]
    fn test_page_response_conversion() {
        let json = r#"{
            "page": 2,
            "results": [
                {
                    "id": 603,
                    "title": "The Matrix",
                    "release_date": "1999-03-30",
                    "overview": "A computer hacker...",
                    "poster_path": "/poster.jpg",
                    "backdrop_path": null,
                    "vote_average": 8.2,
                    "genre_ids": [28, 878]
                },
                {
                    "id": 604,
                    "title": "Unreleased",
                    "release_date": "",
                    "overview": "",
                    "poster_path": null,
                    "backdrop_path": null,
                    "vote_average": null
                }
            ],
            "total_pages": 5,
            "total_results": 97
        }"#;

        let response: TmdbPageResponse = serde_json::from_str(json).unwrap();
        let page: ResultPage = response.into();

        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.total_results, 97);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].genre_ids, vec![28, 878]);
        assert_eq!(page.items[0].year(), Some(1999));
        assert!(page.items[1].release_date.is_none());
        assert!(page.items[1].overview.is_none());
        assert_eq!(page.items[1].vote_average, 0.0);
    }

    #[test]
    fn test_movie_details_conversion() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "original_title": "The Matrix",
            "release_date": "1999-03-30",
            "runtime": 136,
            "overview": "A computer hacker...",
            "tagline": "",
            "poster_path": "/poster.jpg",
            "backdrop_path": null,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "vote_average": 8.2,
            "vote_count": 25000,
            "imdb_id": "tt0133093",
            "homepage": null
        }"#;

        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        let movie: CatalogItemDetails = details.into();
        assert_eq!(movie.runtime_minutes, Some(136));
        assert!(movie.tagline.is_none());
        let names: Vec<&str> = movie.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Action", "Science Fiction"]);
    }

    #[test]
    fn test_genre_list_parsing() {
        let json = r#"{"genres": [{"id": 28, "name": "Action"}, {"id": 35, "name": "Comedy"}]}"#;
        let list: TmdbGenreList = serde_json::from_str(json).unwrap();
        assert_eq!(list.genres.len(), 2);
        assert_eq!(list.genres[1].name, "Comedy");
    }
}
