//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{LogRecord, LogType, QuotaRecord, UrlRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the indexer.
pub trait Storage {
    // ===== URL Management =====

    /// Adds URLs that are not already stored
    ///
    /// Duplicates, whether already stored or repeated within `urls`, are
    /// skipped silently.
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted
    fn add_urls(&mut self, urls: &[String]) -> StorageResult<usize>;

    /// Deletes every row matching `url` exactly
    ///
    /// Removing an absent URL is not an error.
    ///
    /// # Returns
    ///
    /// The number of rows removed
    fn remove_url(&mut self, url: &str) -> StorageResult<usize>;

    /// Sets the last submission time of the matching row(s)
    fn update_last_submitted(&mut self, url: &str, at: DateTime<Utc>) -> StorageResult<usize>;

    /// Records the result of an index status check
    fn record_index_check(
        &mut self,
        url: &str,
        is_indexed: bool,
        checked_at: DateTime<Utc>,
    ) -> StorageResult<usize>;

    /// Gets a URL record by its exact value
    fn get_url(&self, url: &str) -> StorageResult<Option<UrlRecord>>;

    /// Loads up to `limit` URLs, least recently submitted first
    fn load_urls(&self, limit: usize) -> StorageResult<Vec<UrlRecord>>;

    /// Loads URLs that are not indexed and whose index check is missing or
    /// older than `cutoff`
    fn load_unindexed_urls(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<UrlRecord>>;

    // ===== Quota Tracking =====

    /// Gets the quota record for `date`, creating it with a zero count if
    /// absent
    fn get_or_create_quota(&mut self, date: &str) -> StorageResult<QuotaRecord>;

    /// Increments the counter for `date` by one, creating it at one if absent
    ///
    /// # Returns
    ///
    /// The counter value after the increment
    fn increment_quota(&mut self, date: &str) -> StorageResult<u32>;

    // ===== Submission Log =====

    /// Appends a log entry stamped with the current time
    fn insert_log(&mut self, log_type: LogType, message: &str) -> StorageResult<i64>;

    /// Loads the most recent log entries, newest first
    fn load_logs(&self, limit: usize) -> StorageResult<Vec<LogRecord>>;

    // ===== Statistics =====

    /// Gets total URL count
    fn count_urls(&self) -> StorageResult<u64>;

    /// Counts URLs marked as indexed
    fn count_indexed_urls(&self) -> StorageResult<u64>;

    /// Counts URLs that have been submitted at least once
    fn count_submitted_urls(&self) -> StorageResult<u64>;

    /// Counts log entries of one type
    fn count_logs_by_type(&self, log_type: LogType) -> StorageResult<u64>;
}
