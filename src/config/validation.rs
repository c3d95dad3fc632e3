use crate::config::types::{Config, IndexingConfig, QuotaConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Largest accepted recheck interval, roughly ten years
pub const MAX_RECHECK_AFTER_DAYS: i64 = 3650;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_indexing_config(&config.indexing)?;
    validate_quota_config(&config.quota)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates Indexing API configuration
fn validate_indexing_config(config: &IndexingConfig) -> Result<(), ConfigError> {
    if config.credentials_path.is_empty() {
        return Err(ConfigError::Validation(
            "credentials_path cannot be empty".to_string(),
        ));
    }

    validate_http_url("endpoint", &config.endpoint)?;
    validate_http_url("scope", &config.scope)?;

    Ok(())
}

/// Validates quota configuration
fn validate_quota_config(config: &QuotaConfig) -> Result<(), ConfigError> {
    if config.daily_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "daily_limit must be >= 1, got {}",
            config.daily_limit
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if !(1..=MAX_RECHECK_AFTER_DAYS).contains(&config.recheck_after_days) {
        return Err(ConfigError::Validation(format!(
            "recheck_after_days must be between 1 and {}, got {}",
            MAX_RECHECK_AFTER_DAYS, config.recheck_after_days
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that `value` is an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
