//! Types for remote catalog responses.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Stable item identifier assigned by the remote service.
pub type CatalogId = u32;

/// Genre identifier assigned by the remote service.
pub type GenreId = u32;

/// A catalog item as returned by list endpoints (search, discover, trending).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Remote item ID.
    pub id: CatalogId,
    /// Display title.
    pub title: String,
    /// Poster path (relative to the image base URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Backdrop path (relative to the image base URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Average vote (0-10).
    #[serde(default)]
    pub vote_average: f32,
    /// Synopsis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
}

impl CatalogItem {
    /// Get the release year from the release date.
    pub fn year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// Case-insensitive title containment.
    pub fn title_contains(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
    }
}

/// Full details for a single catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItemDetails {
    /// Remote item ID.
    pub id: CatalogId,
    /// Display title.
    pub title: String,
    /// Original title (in original language).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Runtime in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    /// Synopsis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Tagline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    /// Poster path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Backdrop path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    /// Genres with display names.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Average vote (0-10).
    #[serde(default)]
    pub vote_average: f32,
    /// Number of votes.
    #[serde(default)]
    pub vote_count: u32,
    /// IMDb identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// Homepage URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

impl CatalogItemDetails {
    /// Get the release year from the release date.
    pub fn year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// Reduce the details to the list representation.
    pub fn to_item(&self) -> CatalogItem {
        CatalogItem {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
            overview: self.overview.clone(),
            genre_ids: self.genres.iter().map(|g| g.id).collect(),
        }
    }
}

/// A genre entry from the genre catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// One page of results for a single query dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultPage {
    /// Items on this page.
    pub items: Vec<CatalogItem>,
    /// Page number (1-indexed).
    pub page: u32,
    /// Total page count reported by the service.
    pub total_pages: u32,
    /// Total result count reported by the service.
    #[serde(default)]
    pub total_results: u32,
}

impl ResultPage {
    /// An empty first page.
    pub fn empty() -> Self {
        Self {
            items: vec![],
            page: 1,
            total_pages: 1,
            total_results: 0,
        }
    }
}

/// Parameters for a discover (structured filter) request.
///
/// Unset fields impose no constraint and are not transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverQuery {
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<GenreId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<u8>,
}

impl DiscoverQuery {
    /// Query string parameters for the discover endpoint, defined fields only.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("include_adult", "false".to_string()),
            ("sort_by", "popularity.desc".to_string()),
        ];
        if let Some(genre) = self.genre {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = self.year {
            params.push(("primary_release_year", year.to_string()));
        }
        if let Some(rating) = self.min_rating {
            params.push(("vote_average.gte", rating.to_string()));
        }
        params
    }
}

fn release_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.year())
}
