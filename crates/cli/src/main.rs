mod commands;
mod metrics;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelscout_core::{
    load_config, validate_config, BrowseSnapshot, CatalogItemDetails, Genre, KeyValueStore,
    QueryCoordinator, RemoteCatalog, SanitizedConfig, SqliteStore, TmdbClient,
};

use commands::{Command, HELP};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so they never interleave with rendered results.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::var("REELSCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Effective config: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    let catalog: Arc<dyn RemoteCatalog> = Arc::new(
        TmdbClient::new(config.catalog.clone()).context("Failed to create catalog client")?,
    );
    info!("TMDB client initialized");

    let store: Arc<dyn KeyValueStore> = Arc::new(
        SqliteStore::new(&config.storage.path).context("Failed to open storage")?,
    );
    info!("Storage opened at {:?}", config.storage.path);

    let coordinator = Arc::new(QueryCoordinator::new(catalog, store, &config.browse));

    let printer = tokio::spawn(print_snapshots(
        coordinator.subscribe(),
        coordinator.clone(),
    ));

    coordinator.start().await;
    println!("{}", HELP);

    tokio::select! {
        result = read_commands(&coordinator) => result?,
        _ = shutdown_signal() => info!("Interrupted"),
    }

    coordinator.shutdown();
    printer.abort();
    Ok(())
}

/// Read and execute commands until `quit` or end of input.
async fn read_commands(coordinator: &QueryCoordinator) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{:#}", e);
                continue;
            }
        };

        match command {
            Command::Type(text) => coordinator.set_search_text(text),
            Command::Search(text) => {
                coordinator.submit_search(text).await;
            }
            Command::Filter(spec) => {
                coordinator.apply_filters(spec).await;
            }
            Command::Clear => {
                coordinator.clear_filters().await;
            }
            Command::More => {
                coordinator.load_more().await;
            }
            Command::Trending => {
                coordinator.refresh_trending().await;
            }
            Command::Details(id) => {
                if let Some(details) = coordinator.fetch_details(id).await {
                    print_details(&details, coordinator.is_favorite(id));
                }
            }
            Command::Favorite(id) => {
                let favorite = coordinator.toggle_favorite(id);
                println!(
                    "{} {}",
                    id,
                    if favorite { "added to favorites" } else { "removed from favorites" }
                );
            }
            Command::Favorites => {
                let items = coordinator.favorite_items().await;
                if items.is_empty() {
                    println!("No favorites yet");
                }
                for details in items {
                    println!(
                        "{:>8}  {}",
                        details.id,
                        title_line(&details.title, details.year(), details.vote_average)
                    );
                }
            }
            Command::Genres => print_genres(&coordinator.genres()),
            Command::Metrics => print!("{}", metrics::encode_metrics()),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    Ok(())
}

/// Render every settled snapshot whose visible content changed.
async fn print_snapshots(
    mut updates: watch::Receiver<BrowseSnapshot>,
    coordinator: Arc<QueryCoordinator>,
) {
    let mut last: Option<BrowseSnapshot> = None;

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        if snapshot.loading {
            continue;
        }
        let unchanged = last.as_ref().is_some_and(|prev| {
            prev.results == snapshot.results
                && prev.error == snapshot.error
                && prev.search_text.trim() == snapshot.search_text.trim()
                && prev.filters == snapshot.filters
                && prev.total_pages == snapshot.total_pages
        });
        if !unchanged {
            render(&snapshot, &coordinator.genres());
        }
        last = Some(snapshot);
    }
    warn!("Snapshot channel closed");
}

fn render(snapshot: &BrowseSnapshot, genres: &[Genre]) {
    println!();
    println!("== {} ==", snapshot.heading(genres));
    if let Some(error) = &snapshot.error {
        println!("!! {}", error);
    }
    if snapshot.results.is_empty() {
        println!("   (no results)");
    }
    for item in &snapshot.results {
        let marker = if snapshot.is_favorite(item.id) { "*" } else { " " };
        println!(
            "{} {:>8}  {}",
            marker,
            item.id,
            title_line(&item.title, item.year(), item.vote_average)
        );
    }
    println!(
        "   page {}/{}{}",
        snapshot.current_page,
        snapshot.total_pages,
        if snapshot.has_more() { " (more)" } else { "" }
    );
}

fn title_line(title: &str, year: Option<i32>, rating: f32) -> String {
    match year {
        Some(year) => format!("{} ({})  {:.1}", title, year, rating),
        None => format!("{}  {:.1}", title, rating),
    }
}

fn print_details(details: &CatalogItemDetails, favorite: bool) {
    println!();
    println!(
        "{}{}",
        title_line(&details.title, details.year(), details.vote_average),
        if favorite { "  [favorite]" } else { "" }
    );
    if let Some(tagline) = &details.tagline {
        println!("  {}", tagline);
    }
    if let Some(runtime) = details.runtime_minutes {
        println!("  Runtime: {} min", runtime);
    }
    if !details.genres.is_empty() {
        let names: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        println!("  Genres: {}", names.join(", "));
    }
    if let Some(overview) = &details.overview {
        println!("  {}", overview);
    }
}

fn print_genres(genres: &[Genre]) {
    if genres.is_empty() {
        println!("Genres unavailable");
    }
    for genre in genres {
        println!("{:>6}  {}", genre.id, genre.name);
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
