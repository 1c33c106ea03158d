//! Prometheus registry for the CLI.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in reelscout_core::metrics::all_metrics() {
        if let Err(e) = registry.register(metric) {
            tracing::warn!("Failed to register metric: {}", e);
        }
    }
    registry
});

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# failed to encode metrics: {}\n", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_includes_core_metrics() {
        reelscout_core::metrics::FAVORITE_TOGGLES
            .with_label_values(&["added"])
            .inc();
        let text = encode_metrics();
        assert!(text.contains("reelscout_favorite_toggles_total"));
    }
}
