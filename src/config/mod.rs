//! Configuration module for Bulk Indexer
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional and defaults to the values the tool has always used.
//!
//! # Example
//!
//! ```no_run
//! use bulk_indexer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("indexer.toml")).unwrap();
//! println!("Database: {}", config.storage.database_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, IndexingConfig, QuotaConfig, StorageConfig, DEFAULT_BATCH_SIZE,
    DEFAULT_CREDENTIALS_PATH, DEFAULT_DAILY_LIMIT, DEFAULT_DATABASE_PATH, DEFAULT_ENDPOINT,
    DEFAULT_RECHECK_AFTER_DAYS, DEFAULT_SCOPE,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
