//! Query coordinator: owns the browse state and reconciles search text,
//! filters, pagination and favorites into one consistent view.

use std::sync::{Arc, Mutex, Weak};

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::error::BrowseError;
use super::favorites::FavoriteSet;
use super::filter::FilterSpec;
use super::state::{BrowseSnapshot, BrowseState, Dimension, FetchOutcome, PageRequest};
use crate::config::BrowseConfig;
use crate::metrics;
use crate::remote_catalog::{CatalogId, CatalogItemDetails, Genre, GenreId, RemoteCatalog};
use crate::store::{self, KeyValueStore};

/// Coordinates every read of the remote catalog for one browsing session.
///
/// All operations are safe to call concurrently. Fetch failures never
/// surface as `Err`; they are recorded in the state and observed through
/// [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe).
///
/// [`set_search_text`](Self::set_search_text) spawns a timer task, so the
/// coordinator must be driven from within a Tokio runtime.
pub struct QueryCoordinator {
    core: Arc<CoordinatorCore>,
    search_debounce: Debouncer<String>,
}

struct CoordinatorCore {
    catalog: Arc<dyn RemoteCatalog>,
    store: Arc<dyn KeyValueStore>,
    favorites: FavoriteSet,
    state: Mutex<BrowseState>,
    updates: watch::Sender<BrowseSnapshot>,
}

impl QueryCoordinator {
    /// Build a coordinator, loading favorites and the last search from
    /// `store`. Never fails; an unreadable store degrades to memory-only.
    pub fn new(
        catalog: Arc<dyn RemoteCatalog>,
        store: Arc<dyn KeyValueStore>,
        config: &BrowseConfig,
    ) -> Self {
        let (favorites, load_error) = FavoriteSet::load(Arc::clone(&store));

        let mut state = BrowseState::default();
        match store::load_last_search(store.as_ref()) {
            Ok(query) => state.search_text = query,
            Err(e) => warn!("Could not restore last search: {}", e),
        }
        if let Some(e) = &load_error {
            state.error = Some(BrowseError::from_store(
                "Failed to load favorites; changes will not be saved",
                e,
            ));
        }
        state.recompute();

        let (updates, _) = watch::channel(state.snapshot(favorites.ids()));
        let core = Arc::new(CoordinatorCore {
            catalog,
            store,
            favorites,
            state: Mutex::new(state),
            updates,
        });

        let weak: Weak<CoordinatorCore> = Arc::downgrade(&core);
        let search_debounce = Debouncer::new(config.debounce(), move |query: String| {
            let weak = weak.clone();
            async move {
                if let Some(core) = weak.upgrade() {
                    core.commit_search(query).await;
                }
            }
        });

        Self {
            core,
            search_debounce,
        }
    }

    /// Load genres and trending items, and re-run the restored search.
    pub async fn start(&self) {
        info!("Starting browse session");

        match self.core.catalog.genres().await {
            Ok(genres) => {
                debug!("Loaded {} genres", genres.len());
                self.core.update(|st| st.genres = genres);
            }
            Err(e) => warn!("Failed to load genres: {}", e),
        }

        let restored = self.core.read(|st| st.search_query().to_string());
        let trending = self.core.issue(PageRequest::Trending { page: 1 });
        let search = async {
            if !restored.is_empty() {
                info!("Restoring last search \"{}\"", restored);
                self.core.commit_search(restored.clone()).await;
            }
        };
        tokio::join!(trending, search);
    }

    /// Update the search text. The view reconciles immediately; the remote
    /// search is committed once the text has been stable for the debounce
    /// window.
    ///
    /// Must be called from within a Tokio runtime: the debounce timer is
    /// spawned onto it.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.core.update(|st| st.search_text = text.clone());
        self.search_debounce.schedule(text);
    }

    /// Set the search text and commit it now, skipping the debounce window.
    pub async fn submit_search(&self, text: impl Into<String>) -> FetchOutcome {
        let text = text.into();
        self.search_debounce.cancel();
        self.core.update(|st| st.search_text = text.clone());
        self.core.commit_search(text).await
    }

    /// Whether a debounced search commit is waiting to fire.
    pub fn is_search_pending(&self) -> bool {
        self.search_debounce.is_pending()
    }

    /// Replace the structured filters and fetch the first filtered page.
    ///
    /// A spec with every facet unset behaves like [`clear_filters`](Self::clear_filters).
    pub async fn apply_filters(&self, spec: FilterSpec) -> FetchOutcome {
        if !spec.is_active() {
            return self.clear_filters().await;
        }

        info!("Applying filters: {:?}", spec);
        let token = self.core.update(|st| {
            st.filters = spec;
            st.begin(Dimension::Filter)
        });
        self.core
            .run(token, PageRequest::Filter { spec, page: 1 })
            .await
    }

    /// Drop all filters. Restores the unfiltered search results when they
    /// match the current search text, otherwise re-fetches them.
    pub async fn clear_filters(&self) -> FetchOutcome {
        let refetch = self.core.update(|st| {
            st.filters = FilterSpec::default();
            st.filtered = None;
            st.tokens.issue(Dimension::Filter);

            let query = st.search_query().to_string();
            if query.is_empty() {
                return None;
            }
            match &st.search {
                Some(cache) if cache.query == query => None,
                _ => {
                    st.search = None;
                    Some(query)
                }
            }
        });

        match refetch {
            Some(query) => {
                debug!("No snapshot for \"{}\", re-fetching", query);
                self.core
                    .issue(PageRequest::Search { query, page: 1 })
                    .await
            }
            None => FetchOutcome::Skipped,
        }
    }

    /// Fetch the next page of the authoritative dimension.
    ///
    /// No-op while a fetch is in flight, on the last page, or when showing
    /// trending items.
    pub async fn load_more(&self) -> FetchOutcome {
        let prepared = self.core.update(|st| {
            if st.is_loading() {
                return None;
            }
            let request = st.next_page_request()?;
            let token = st.begin(request.dimension());
            Some((token, request))
        });

        match prepared {
            Some((token, request)) => self.core.run(token, request).await,
            None => {
                debug!("Nothing more to load");
                FetchOutcome::Skipped
            }
        }
    }

    /// Re-fetch the first trending page.
    pub async fn refresh_trending(&self) -> FetchOutcome {
        self.core.issue(PageRequest::Trending { page: 1 }).await
    }

    /// Load full details for one item and mark it selected.
    pub async fn fetch_details(&self, id: CatalogId) -> Option<CatalogItemDetails> {
        let token = self.core.update(|st| st.begin_details());
        let result = self.core.catalog.details(id).await;
        self.core.update(|st| st.complete_details(token, result))
    }

    /// Flip favorite membership. Returns the membership after the toggle.
    pub fn toggle_favorite(&self, id: CatalogId) -> bool {
        let toggled = self.core.favorites.toggle(id);
        self.core.update(|st| {
            if let Some(e) = &toggled.error {
                st.error = Some(BrowseError::from_store(
                    "Failed to save favorites; changes are kept for this session",
                    e,
                ));
            }
        });
        toggled.favorite
    }

    pub fn is_favorite(&self, id: CatalogId) -> bool {
        self.core.favorites.is_favorite(id)
    }

    pub fn favorites(&self) -> Vec<CatalogId> {
        self.core.favorites.ids()
    }

    /// Details for every favorite, fetched concurrently. Items that fail to
    /// load are skipped.
    pub async fn favorite_items(&self) -> Vec<CatalogItemDetails> {
        let ids = self.core.favorites.ids();
        let results = join_all(ids.iter().map(|&id| self.core.catalog.details(id))).await;

        ids.into_iter()
            .zip(results)
            .filter_map(|(id, result)| match result {
                Ok(details) => Some(details),
                Err(e) => {
                    warn!("Failed to load favorite {}: {}", id, e);
                    None
                }
            })
            .collect()
    }

    pub fn genres(&self) -> Vec<Genre> {
        self.core.read(|st| st.genres.clone())
    }

    pub fn genre_name(&self, id: GenreId) -> Option<String> {
        self.core.read(|st| {
            st.genres
                .iter()
                .find(|g| g.id == id)
                .map(|g| g.name.clone())
        })
    }

    pub fn snapshot(&self) -> BrowseSnapshot {
        self.core.updates.borrow().clone()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<BrowseSnapshot> {
        self.core.updates.subscribe()
    }

    /// Cancel any pending debounced search.
    pub fn shutdown(&self) {
        if self.search_debounce.cancel() {
            debug!("Cancelled pending search commit");
        }
        info!("Browse session stopped");
    }
}

impl CoordinatorCore {
    /// Mutate the state, re-derive the results and publish a snapshot.
    /// The lock is never held across an await point.
    fn update<R>(&self, f: impl FnOnce(&mut BrowseState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        let result = f(&mut state);
        state.recompute();
        self.updates
            .send_replace(state.snapshot(self.favorites.ids()));
        result
    }

    fn read<R>(&self, f: impl FnOnce(&BrowseState) -> R) -> R {
        let state = self.state.lock().unwrap();
        f(&state)
    }

    /// Persist the query and, unless filters are active or the query is
    /// empty, fetch its first page.
    async fn commit_search(&self, query: String) -> FetchOutcome {
        let query = query.trim().to_string();
        if let Err(e) = store::save_last_search(self.store.as_ref(), &query) {
            warn!("Failed to save last search: {}", e);
        }

        let fetch = self.update(|st| {
            if st.filters.is_active() {
                return false;
            }
            if query.is_empty() {
                st.tokens.issue(Dimension::Search);
                st.search = None;
                return false;
            }
            true
        });

        if !fetch {
            return FetchOutcome::Skipped;
        }
        debug!("Committing search \"{}\"", query);
        self.issue(PageRequest::Search { query, page: 1 }).await
    }

    async fn issue(&self, request: PageRequest) -> FetchOutcome {
        let token = self.update(|st| st.begin(request.dimension()));
        self.run(token, request).await
    }

    /// Perform the remote call for an already-issued token and apply it.
    async fn run(&self, token: u64, request: PageRequest) -> FetchOutcome {
        let dimension = request.dimension();
        let result = match &request {
            PageRequest::Trending { page } => self.catalog.trending(*page).await,
            PageRequest::Search { query, page } => self.catalog.search(query, *page).await,
            PageRequest::Filter { spec, page } => {
                self.catalog.discover(&spec.to_query(*page)).await
            }
        };

        if let Err(e) = &result {
            warn!("{} fetch failed: {}", dimension.as_str(), e);
        }

        let outcome = self.update(|st| st.complete(token, request, result));
        metrics::DIMENSION_FETCHES
            .with_label_values(&[dimension.as_str(), outcome.as_str()])
            .inc();
        outcome
    }
}
