//! Browsing: search, filters, pagination and favorites over a remote catalog.

mod coordinator;
mod debounce;
mod error;
mod favorites;
mod filter;
mod state;

pub use coordinator::QueryCoordinator;
pub use debounce::Debouncer;
pub use error::{BrowseError, ErrorKind};
pub use favorites::{FavoriteSet, Toggled};
pub use filter::{restrict_by_title, FilterSpec};
pub use state::{BrowseSnapshot, Dimension, FetchOutcome, FilterCache, PageCache, SearchCache};
