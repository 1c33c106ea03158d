//! Testing utilities and mock implementations.
//!
//! Provides a scriptable [`MockCatalog`] and a [`FailingStore`] so the
//! browse flow can be exercised without network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelscout_core::testing::{fixtures, MockCatalog};
//!
//! let catalog = MockCatalog::new();
//! catalog.set_search_pages("batman", vec![fixtures::items(1..=20, "Batman")]).await;
//! catalog.set_search_delay("batman", Duration::from_millis(200)).await;
//! ```

mod failing_store;
mod mock_catalog;

pub use failing_store::FailingStore;
pub use mock_catalog::{MockCatalog, RecordedCatalogQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::ops::RangeInclusive;

    use crate::remote_catalog::{CatalogId, CatalogItem, CatalogItemDetails, Genre, ResultPage};

    /// Create a catalog item with reasonable defaults.
    pub fn catalog_item(id: CatalogId, title: &str) -> CatalogItem {
        CatalogItem {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            backdrop_path: None,
            release_date: Some("2020-06-15".to_string()),
            vote_average: 7.0,
            overview: Some(format!("A movie about {}.", title.to_lowercase())),
            genre_ids: vec![28],
        }
    }

    /// Items with ids from `ids`, titled "`prefix` `id`".
    pub fn items(ids: RangeInclusive<CatalogId>, prefix: &str) -> Vec<CatalogItem> {
        ids.map(|id| catalog_item(id, &format!("{} {}", prefix, id)))
            .collect()
    }

    pub fn result_page(items: Vec<CatalogItem>, page: u32, total_pages: u32) -> ResultPage {
        ResultPage {
            total_results: items.len() as u32 * total_pages,
            items,
            page,
            total_pages,
        }
    }

    /// A small genre catalog.
    pub fn genres() -> Vec<Genre> {
        [(28, "Action"), (35, "Comedy"), (18, "Drama"), (878, "Science Fiction")]
            .into_iter()
            .map(|(id, name)| Genre {
                id,
                name: name.to_string(),
            })
            .collect()
    }

    pub fn details(id: CatalogId, title: &str) -> CatalogItemDetails {
        CatalogItemDetails {
            id,
            title: title.to_string(),
            original_title: None,
            release_date: Some("2020-06-15".to_string()),
            runtime_minutes: Some(120),
            overview: Some(format!("A movie about {}.", title.to_lowercase())),
            tagline: None,
            poster_path: Some(format!("/poster-{}.jpg", id)),
            backdrop_path: None,
            genres: vec![Genre {
                id: 28,
                name: "Action".to_string(),
            }],
            vote_average: 7.0,
            vote_count: 1000,
            imdb_id: None,
            homepage: None,
        }
    }
}
