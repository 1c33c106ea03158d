//! Mock remote catalog for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::browse::FilterSpec;
use crate::remote_catalog::{
    CatalogError, CatalogId, CatalogItem, CatalogItemDetails, DiscoverQuery, Genre, RemoteCatalog,
    ResultPage,
};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogQuery {
    Search { query: String, page: u32 },
    Discover(DiscoverQuery),
    Trending { page: u32 },
    Details { id: CatalogId },
    Genres,
}

type Pages = Vec<Vec<CatalogItem>>;

/// Mock implementation of the RemoteCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Serve scripted pages per query, filter set, and for trending
/// - Track queries for assertions
/// - Simulate failures and slow responses
///
/// Page `n` of a query is the `n`th configured list; `total_pages` is the
/// number of configured lists. Unknown queries return an empty page.
#[derive(Debug, Default)]
pub struct MockCatalog {
    /// Search pages by query text.
    search: Arc<RwLock<HashMap<String, Pages>>>,
    /// Discover pages by filter set.
    discover: Arc<RwLock<Vec<(FilterSpec, Pages)>>>,
    trending: Arc<RwLock<Pages>>,
    details: Arc<RwLock<HashMap<CatalogId, CatalogItemDetails>>>,
    genres: Arc<RwLock<Vec<Genre>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    /// Response delay for specific search queries.
    search_delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Delay applied to the next operation only.
    next_delay: Arc<RwLock<Option<Duration>>>,
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub async fn set_search_pages(&self, query: &str, pages: Pages) {
        self.search.write().await.insert(query.to_string(), pages);
    }

    pub async fn set_discover_pages(&self, spec: FilterSpec, pages: Pages) {
        let mut discover = self.discover.write().await;
        discover.retain(|(s, _)| *s != spec);
        discover.push((spec, pages));
    }

    pub async fn set_trending_pages(&self, pages: Pages) {
        *self.trending.write().await = pages;
    }

    pub async fn add_details(&self, details: CatalogItemDetails) {
        self.details.write().await.insert(details.id, details);
    }

    pub async fn set_genres(&self, genres: Vec<Genre>) {
        *self.genres.write().await = genres;
    }

    /// Delay every response to `query` by `delay`.
    pub async fn set_search_delay(&self, query: &str, delay: Duration) {
        self.search_delays
            .write()
            .await
            .insert(query.to_string(), delay);
    }

    pub async fn set_next_delay(&self, delay: Duration) {
        *self.next_delay.write().await = Some(delay);
    }

    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Record the query, wait out any delay, then surface a pending error.
    async fn begin(
        &self,
        query: RecordedCatalogQuery,
        delay: Option<Duration>,
    ) -> Result<(), CatalogError> {
        self.queries.write().await.push(query);

        let delay = self.next_delay.write().await.take().or(delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn page_of(pages: Option<&Pages>, page: u32) -> ResultPage {
        let Some(pages) = pages else {
            return ResultPage::empty();
        };
        let items = pages
            .get(page.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_default();
        ResultPage {
            total_results: pages.iter().map(|p| p.len() as u32).sum(),
            items,
            page,
            total_pages: pages.len() as u32,
        }
    }
}

#[async_trait]
impl RemoteCatalog for MockCatalog {
    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, CatalogError> {
        let delay = self.search_delays.read().await.get(query).copied();
        self.begin(
            RecordedCatalogQuery::Search {
                query: query.to_string(),
                page,
            },
            delay,
        )
        .await?;
        Ok(Self::page_of(self.search.read().await.get(query), page))
    }

    async fn discover(&self, query: &DiscoverQuery) -> Result<ResultPage, CatalogError> {
        self.begin(RecordedCatalogQuery::Discover(*query), None)
            .await?;
        let spec = FilterSpec {
            genre: query.genre,
            year: query.year,
            min_rating: query.min_rating,
        };
        let discover = self.discover.read().await;
        let pages = discover.iter().find(|(s, _)| *s == spec).map(|(_, p)| p);
        Ok(Self::page_of(pages, query.page))
    }

    async fn trending(&self, page: u32) -> Result<ResultPage, CatalogError> {
        self.begin(RecordedCatalogQuery::Trending { page }, None)
            .await?;
        Ok(Self::page_of(Some(&*self.trending.read().await), page))
    }

    async fn details(&self, id: CatalogId) -> Result<CatalogItemDetails, CatalogError> {
        self.begin(RecordedCatalogQuery::Details { id }, None).await?;
        self.details
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("movie {}", id)))
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        self.begin(RecordedCatalogQuery::Genres, None).await?;
        Ok(self.genres.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_pages_and_recording() {
        let catalog = MockCatalog::new();
        catalog
            .set_search_pages(
                "spider",
                vec![fixtures::items(1..=2, "Spider"), fixtures::items(3..=4, "Spider")],
            )
            .await;

        let page = catalog.search("spider", 2).await.unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].id, 3);

        let unknown = catalog.search("nothing", 1).await.unwrap();
        assert!(unknown.items.is_empty());

        assert_eq!(
            catalog.recorded_queries().await,
            vec![
                RecordedCatalogQuery::Search {
                    query: "spider".to_string(),
                    page: 2
                },
                RecordedCatalogQuery::Search {
                    query: "nothing".to_string(),
                    page: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_next_error_is_one_shot() {
        let catalog = MockCatalog::new();
        catalog.set_next_error(CatalogError::RateLimitExceeded).await;

        assert!(catalog.trending(1).await.is_err());
        assert!(catalog.trending(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_details_is_not_found() {
        let catalog = MockCatalog::new();
        let result = catalog.details(1).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}
