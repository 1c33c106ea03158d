pub mod browse;
pub mod config;
pub mod metrics;
pub mod remote_catalog;
pub mod store;
pub mod testing;

pub use browse::{
    BrowseError, BrowseSnapshot, Dimension, ErrorKind, FetchOutcome, FilterSpec, QueryCoordinator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, BrowseConfig, Config, ConfigError,
    SanitizedConfig, StorageConfig,
};
pub use remote_catalog::{
    CatalogError, CatalogId, CatalogItem, CatalogItemDetails, DiscoverQuery, Genre, GenreId,
    RemoteCatalog, ResultPage, TmdbClient, TmdbConfig,
};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
