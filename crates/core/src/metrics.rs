//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Remote catalog requests (TMDB)
//! - Browse dimensions (fetch results, stale responses)
//! - Favorites

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Remote Catalog
// =============================================================================

/// Remote catalog requests total.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelscout_catalog_requests_total",
            "Total remote catalog requests",
        ),
        &["operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Remote catalog request duration in seconds.
pub static CATALOG_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelscout_catalog_request_duration_seconds",
            "Duration of remote catalog requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Browse
// =============================================================================

/// Dimension fetches by outcome.
pub static DIMENSION_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelscout_dimension_fetches_total",
            "Total dimension fetches completed",
        ),
        &["dimension", "result"], // result: "applied", "stale", "failed"
    )
    .unwrap()
});

/// Responses discarded because a newer request superseded them.
pub static STALE_RESPONSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelscout_stale_responses_total",
            "Responses discarded because a newer request was issued",
        ),
        &["dimension"],
    )
    .unwrap()
});

/// Favorite toggles by action.
pub static FAVORITE_TOGGLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelscout_favorite_toggles_total", "Total favorite toggles"),
        &["action"], // "added", "removed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CATALOG_REQUESTS.clone()),
        Box::new(CATALOG_REQUEST_DURATION.clone()),
        Box::new(DIMENSION_FETCHES.clone()),
        Box::new(STALE_RESPONSES.clone()),
        Box::new(FAVORITE_TOGGLES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_once() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        STALE_RESPONSES.with_label_values(&["search"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "reelscout_stale_responses_total"));
    }
}
