use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog API key is not empty
/// - Catalog timeout is not 0
/// - Debounce window is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.api_key cannot be empty".to_string(),
        ));
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.browse.debounce_ms == 0 {
        return Err(ConfigError::ValidationError(
            "browse.debounce_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}
