//! Storage module for persisting indexing state
//!
//! This module handles all database operations for the indexer, including:
//! - SQLite database initialization and schema management
//! - Candidate URL bookkeeping (submission and index-check timestamps)
//! - Daily quota counters
//! - The append-only submission log

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a candidate URL in the database
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    pub last_submitted: Option<DateTime<Utc>>,
    pub index_checked_date: Option<DateTime<Utc>>,
    pub is_indexed: bool,
}

/// Submission counter for one calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRecord {
    pub id: i64,
    /// Calendar date in `YYYY-MM-DD` form
    pub date: String,
    pub count: u32,
}

/// Represents an entry in the submission log
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub log_type: LogType,
    pub message: String,
}

/// Kind of a submission log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogType {
    /// The Indexing API accepted a notification
    Submitted,
    /// The Indexing API rejected a notification or the request failed
    Error,
}

impl LogType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Error => "error",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(Self::Submitted),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Formats a timestamp the way it is stored in the database
///
/// The fixed precision keeps lexical and chronological order identical, which
/// the stale index-check query relies on.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}
