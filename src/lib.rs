//! Bulk Indexer: daily-quota aware URL submission for the Indexing API
//!
//! This crate keeps a local store of candidate URLs, submits them to the
//! search engine Indexing API in batches while respecting a daily quota,
//! and records the outcome of every submission.

pub mod config;
pub mod indexing;
pub mod loader;
pub mod output;
pub mod quota;
pub mod storage;
pub mod submitter;

use thiserror::Error;

/// Main error type for Bulk Indexer operations
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Indexing API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors reported by the Indexing API or while authenticating against it
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP {status} when publishing {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for Bulk Indexer operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for Indexing API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// Re-export commonly used types
pub use config::Config;
pub use quota::QuotaTracker;
pub use storage::{SqliteStorage, Storage};
pub use submitter::{BatchReport, BatchSubmitter};
