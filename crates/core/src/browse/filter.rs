//! Structured filters and the local title restriction.

use serde::{Deserialize, Serialize};

use crate::remote_catalog::{CatalogItem, DiscoverQuery, Genre, GenreId};

/// Structured filter facets. Each facet is independently optional; an unset
/// facet imposes no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<GenreId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<u8>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genre(mut self, genre: GenreId) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_min_rating(mut self, rating: u8) -> Self {
        self.min_rating = Some(rating);
        self
    }

    /// At least one facet is set.
    pub fn is_active(&self) -> bool {
        self.genre.is_some() || self.year.is_some() || self.min_rating.is_some()
    }

    /// Discover request for the given page, carrying only the set facets.
    pub fn to_query(&self, page: u32) -> DiscoverQuery {
        DiscoverQuery {
            page,
            genre: self.genre,
            year: self.year,
            min_rating: self.min_rating,
        }
    }

    /// Human readable summary, e.g. `Genre: Action, Year: 2020, Rating: 7+`.
    ///
    /// Unknown genre ids fall back to `Genre: <id>`.
    pub fn describe(&self, genres: &[Genre]) -> String {
        let mut parts = Vec::new();

        if let Some(id) = self.genre {
            match genres.iter().find(|g| g.id == id) {
                Some(genre) => parts.push(format!("Genre: {}", genre.name)),
                None => parts.push(format!("Genre: {}", id)),
            }
        }
        if let Some(year) = self.year {
            parts.push(format!("Year: {}", year));
        }
        if let Some(rating) = self.min_rating {
            parts.push(format!("Rating: {}+", rating));
        }

        parts.join(", ")
    }
}

/// Keep the items whose title contains `query`, case-insensitively.
///
/// The query is trimmed first; an empty query keeps every item.
pub fn restrict_by_title(items: &[CatalogItem], query: &str) -> Vec<CatalogItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| item.title_contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_is_active() {
        assert!(!FilterSpec::new().is_active());
        assert!(FilterSpec::new().with_genre(28).is_active());
        assert!(FilterSpec::new().with_year(2020).is_active());
        assert!(FilterSpec::new().with_min_rating(7).is_active());
    }

    #[test]
    fn test_to_query_copies_only_set_facets() {
        let spec = FilterSpec::new().with_genre(28).with_min_rating(7);
        assert_eq!(
            spec.to_query(3),
            DiscoverQuery {
                page: 3,
                genre: Some(28),
                year: None,
                min_rating: Some(7),
            }
        );
    }

    #[test]
    fn test_describe() {
        let genres = vec![Genre {
            id: 28,
            name: "Action".to_string(),
        }];
        let spec = FilterSpec::new()
            .with_genre(28)
            .with_year(2020)
            .with_min_rating(7);
        assert_eq!(spec.describe(&genres), "Genre: Action, Year: 2020, Rating: 7+");
        assert_eq!(
            FilterSpec::new().with_genre(99).describe(&genres),
            "Genre: 99"
        );
        assert_eq!(FilterSpec::new().describe(&genres), "");
    }

    #[test]
    fn test_restrict_by_title() {
        let items = vec![
            fixtures::catalog_item(1, "Spider-Man"),
            fixtures::catalog_item(2, "The Amazing SPIDER-Man"),
            fixtures::catalog_item(3, "Batman Begins"),
        ];

        let restricted = restrict_by_title(&items, "spider");
        let ids: Vec<u32> = restricted.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);

        assert_eq!(restrict_by_title(&items, "  BATMAN ").len(), 1);
        assert!(restrict_by_title(&items, "superman").is_empty());
    }

    #[test]
    fn test_restrict_by_empty_text_is_identity() {
        let items = vec![
            fixtures::catalog_item(1, "Heat"),
            fixtures::catalog_item(2, "Ronin"),
        ];
        assert_eq!(restrict_by_title(&items, ""), items);
        assert_eq!(restrict_by_title(&items, "   "), items);
    }
}
