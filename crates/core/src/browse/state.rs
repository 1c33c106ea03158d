//! Browse state: page caches per dimension, request tokens, and the
//! reconciliation that derives the visible result list.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::error::{BrowseError, ErrorKind};
use super::filter::{restrict_by_title, FilterSpec};
use crate::metrics;
use crate::remote_catalog::{
    CatalogError, CatalogId, CatalogItem, CatalogItemDetails, Genre, ResultPage,
};

/// An independent source of paginated remote results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[default]
    Trending,
    Search,
    Filter,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Trending => "trending",
            Dimension::Search => "search",
            Dimension::Filter => "filter",
        }
    }

    fn failure_context(&self) -> &'static str {
        match self {
            Dimension::Trending => "Failed to load trending movies",
            Dimension::Search => "Failed to search movies",
            Dimension::Filter => "Failed to apply filters",
        }
    }
}

/// What happened to a coordinator operation that may hit the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the state.
    Applied,
    /// A newer request for the same dimension superseded this one.
    Stale,
    /// The request failed; the error is recorded in the state.
    Failed,
    /// No remote call was needed or possible.
    Skipped,
}

impl FetchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchOutcome::Applied => "applied",
            FetchOutcome::Stale => "stale",
            FetchOutcome::Failed => "failed",
            FetchOutcome::Skipped => "skipped",
        }
    }
}

/// Monotonic request tokens, one counter per dimension plus one for details.
#[derive(Debug, Default)]
pub(crate) struct RequestTokens {
    trending: u64,
    search: u64,
    filter: u64,
    details: u64,
}

impl RequestTokens {
    fn counter(&mut self, dimension: Dimension) -> &mut u64 {
        match dimension {
            Dimension::Trending => &mut self.trending,
            Dimension::Search => &mut self.search,
            Dimension::Filter => &mut self.filter,
        }
    }

    /// Issue a new token, invalidating every earlier one for `dimension`.
    pub fn issue(&mut self, dimension: Dimension) -> u64 {
        let counter = self.counter(dimension);
        *counter += 1;
        *counter
    }

    pub fn is_current(&self, dimension: Dimension, token: u64) -> bool {
        let latest = match dimension {
            Dimension::Trending => self.trending,
            Dimension::Search => self.search,
            Dimension::Filter => self.filter,
        };
        latest == token
    }

    pub fn issue_details(&mut self) -> u64 {
        self.details += 1;
        self.details
    }

    pub fn is_current_details(&self, token: u64) -> bool {
        self.details == token
    }
}

/// Accumulated pages of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCache {
    pub items: Vec<CatalogItem>,
    /// Last page fetched (1-indexed).
    pub page: u32,
    pub total_pages: u32,
}

impl Default for PageCache {
    fn default() -> Self {
        Self {
            items: vec![],
            page: 1,
            total_pages: 1,
        }
    }
}

impl PageCache {
    pub fn from_page(page: ResultPage) -> Self {
        let current = page.page.max(1);
        Self {
            items: page.items,
            page: current,
            total_pages: page.total_pages.max(current),
        }
    }

    /// Append a later page, skipping items already present.
    pub fn append(&mut self, page: ResultPage) {
        let mut seen: HashSet<CatalogId> = self.items.iter().map(|i| i.id).collect();
        self.items
            .extend(page.items.into_iter().filter(|item| seen.insert(item.id)));
        self.page = page.page.max(self.page);
        self.total_pages = page.total_pages.max(self.page);
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Search pages together with the query they belong to. Doubles as the
/// unfiltered search snapshot restored when filters are cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCache {
    pub query: String,
    pub pages: PageCache,
}

/// Filtered pages together with the filter set they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCache {
    pub spec: FilterSpec,
    pub pages: PageCache,
}

/// A page fetch, bound to the query it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PageRequest {
    Trending { page: u32 },
    Search { query: String, page: u32 },
    Filter { spec: FilterSpec, page: u32 },
}

impl PageRequest {
    pub fn dimension(&self) -> Dimension {
        match self {
            PageRequest::Trending { .. } => Dimension::Trending,
            PageRequest::Search { .. } => Dimension::Search,
            PageRequest::Filter { .. } => Dimension::Filter,
        }
    }
}

/// Everything display collaborators can observe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrowseSnapshot {
    pub search_text: String,
    pub filters: FilterSpec,
    /// Dimension the results currently come from.
    pub dimension: Dimension,
    pub results: Vec<CatalogItem>,
    pub current_page: u32,
    pub total_pages: u32,
    pub loading: bool,
    pub error: Option<BrowseError>,
    /// Last item loaded through `fetch_details`.
    pub selected: Option<CatalogItemDetails>,
    pub favorites: Vec<CatalogId>,
}

impl BrowseSnapshot {
    pub fn is_favorite(&self, id: CatalogId) -> bool {
        self.favorites.contains(&id)
    }

    /// Whether `load_more` can fetch another page.
    pub fn has_more(&self) -> bool {
        self.dimension != Dimension::Trending && self.current_page < self.total_pages
    }

    /// Title for the result list.
    pub fn heading(&self, genres: &[Genre]) -> String {
        let query = self.search_text.trim();
        let filtered = format!("Filtered Movies ({})", self.filters.describe(genres));
        match (query.is_empty(), self.filters.is_active()) {
            (false, true) => format!("Results for \"{}\" in {}", query, filtered),
            (false, false) => format!("Results for \"{}\"", query),
            (true, true) => filtered,
            (true, false) => "Trending This Week".to_string(),
        }
    }
}

/// Mutable browse state. Owned by the coordinator behind a mutex.
#[derive(Debug, Default)]
pub(crate) struct BrowseState {
    pub search_text: String,
    pub filters: FilterSpec,
    pub trending: PageCache,
    pub search: Option<SearchCache>,
    pub filtered: Option<FilterCache>,
    pub results: Vec<CatalogItem>,
    pub selected: Option<CatalogItemDetails>,
    pub genres: Vec<Genre>,
    pub error: Option<BrowseError>,
    pub in_flight: usize,
    pub tokens: RequestTokens,
}

impl BrowseState {
    /// Trimmed search text.
    pub fn search_query(&self) -> &str {
        self.search_text.trim()
    }

    /// Dimension that owns the visible results and pagination.
    pub fn authoritative(&self) -> Dimension {
        if self.filters.is_active() {
            Dimension::Filter
        } else if !self.search_query().is_empty() {
            Dimension::Search
        } else {
            Dimension::Trending
        }
    }

    fn active_filter_cache(&self) -> Option<&FilterCache> {
        self.filtered.as_ref().filter(|c| c.spec == self.filters)
    }

    /// Derive the visible results from search text, filters and caches.
    pub fn reconcile(&self) -> Vec<CatalogItem> {
        match self.authoritative() {
            Dimension::Filter => self
                .active_filter_cache()
                .map(|c| restrict_by_title(&c.pages.items, self.search_query()))
                .unwrap_or_default(),
            Dimension::Search => self
                .search
                .as_ref()
                .map(|c| c.pages.items.clone())
                .unwrap_or_default(),
            Dimension::Trending => self.trending.items.clone(),
        }
    }

    pub fn recompute(&mut self) {
        self.results = self.reconcile();
    }

    /// Page position of the authoritative dimension.
    pub fn pages(&self) -> (u32, u32) {
        let cache = match self.authoritative() {
            Dimension::Filter => self.active_filter_cache().map(|c| &c.pages),
            Dimension::Search => self.search.as_ref().map(|c| &c.pages),
            Dimension::Trending => Some(&self.trending),
        };
        cache.map_or((1, 1), |c| (c.page, c.total_pages))
    }

    /// Request for the next page of the authoritative dimension, if any.
    pub fn next_page_request(&self) -> Option<PageRequest> {
        match self.authoritative() {
            Dimension::Filter => self
                .active_filter_cache()
                .filter(|c| c.pages.has_more())
                .map(|c| PageRequest::Filter {
                    spec: c.spec,
                    page: c.pages.page + 1,
                }),
            Dimension::Search => self
                .search
                .as_ref()
                .filter(|c| c.query == self.search_query() && c.pages.has_more())
                .map(|c| PageRequest::Search {
                    query: c.query.clone(),
                    page: c.pages.page + 1,
                }),
            Dimension::Trending => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Fetch errors are replaced by the next fetch; storage errors persist
    /// because the store stays degraded for the session.
    fn clear_fetch_error(&mut self) {
        if matches!(&self.error, Some(e) if e.kind != ErrorKind::StorageUnavailable) {
            self.error = None;
        }
    }

    /// Register an outgoing page request and return its token.
    pub fn begin(&mut self, dimension: Dimension) -> u64 {
        self.in_flight += 1;
        self.clear_fetch_error();
        self.tokens.issue(dimension)
    }

    /// Apply a page response unless a newer request superseded it.
    ///
    /// Failures leave caches and results untouched.
    pub fn complete(
        &mut self,
        token: u64,
        request: PageRequest,
        result: Result<ResultPage, CatalogError>,
    ) -> FetchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let dimension = request.dimension();

        if !self.tokens.is_current(dimension, token) {
            debug!(
                "Discarding stale {} response (token {})",
                dimension.as_str(),
                token
            );
            metrics::STALE_RESPONSES
                .with_label_values(&[dimension.as_str()])
                .inc();
            return FetchOutcome::Stale;
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.error = Some(BrowseError::from_catalog(dimension.failure_context(), &e));
                if let PageRequest::Filter { page: 1, .. } = request {
                    // Back to the last filter set whose pages are cached.
                    self.filters = self
                        .filtered
                        .as_ref()
                        .map(|c| c.spec)
                        .unwrap_or_default();
                }
                return FetchOutcome::Failed;
            }
        };

        match request {
            PageRequest::Trending { .. } => self.trending = PageCache::from_page(page),
            PageRequest::Search { query, page: requested } => match &mut self.search {
                Some(cache) if requested > 1 && cache.query == query => cache.pages.append(page),
                _ => {
                    self.search = Some(SearchCache {
                        query,
                        pages: PageCache::from_page(page),
                    })
                }
            },
            PageRequest::Filter { spec, page: requested } => match &mut self.filtered {
                Some(cache) if requested > 1 && cache.spec == spec => cache.pages.append(page),
                _ => {
                    self.filtered = Some(FilterCache {
                        spec,
                        pages: PageCache::from_page(page),
                    })
                }
            },
        }

        FetchOutcome::Applied
    }

    pub fn begin_details(&mut self) -> u64 {
        self.in_flight += 1;
        self.clear_fetch_error();
        self.tokens.issue_details()
    }

    pub fn complete_details(
        &mut self,
        token: u64,
        result: Result<CatalogItemDetails, CatalogError>,
    ) -> Option<CatalogItemDetails> {
        self.in_flight = self.in_flight.saturating_sub(1);

        if !self.tokens.is_current_details(token) {
            debug!("Discarding stale details response (token {})", token);
            return None;
        }

        match result {
            Ok(details) => {
                self.selected = Some(details.clone());
                Some(details)
            }
            Err(e) => {
                self.error = Some(BrowseError::from_catalog(
                    "Failed to load movie details",
                    &e,
                ));
                None
            }
        }
    }

    pub fn snapshot(&self, favorites: Vec<CatalogId>) -> BrowseSnapshot {
        let (current_page, total_pages) = self.pages();
        BrowseSnapshot {
            search_text: self.search_text.clone(),
            filters: self.filters,
            dimension: self.authoritative(),
            results: self.results.clone(),
            current_page,
            total_pages,
            loading: self.is_loading(),
            error: self.error.clone(),
            selected: self.selected.clone(),
            favorites,
        }
    }
}
