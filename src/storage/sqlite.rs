//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{
    format_timestamp, parse_timestamp, LogRecord, LogType, QuotaRecord, UrlRecord,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const URL_COLUMNS: &str = "id, url, last_submitted, index_checked_date, is_indexed";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Missing parent directories are created and the schema is ensured on
    /// every open.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        tracing::debug!("Opened database at {}", path.display());
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Reads a nullable timestamp column
fn optional_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|v| {
            parse_timestamp(&v)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        })
        .transpose()
}

fn url_from_row(row: &Row<'_>) -> rusqlite::Result<UrlRecord> {
    Ok(UrlRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        last_submitted: optional_timestamp(row, 2)?,
        index_checked_date: optional_timestamp(row, 3)?,
        is_indexed: row.get(4)?,
    })
}

impl Storage for SqliteStorage {
    // ===== URL Management =====

    fn add_urls(&mut self, urls: &[String]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut added = 0;

        for url in urls {
            let existing: Option<i64> = tx
                .query_row("SELECT id FROM urls WHERE url = ?1", params![url], |row| {
                    row.get(0)
                })
                .optional()?;

            if existing.is_some() {
                tracing::trace!("Skipping duplicate URL {}", url);
                continue;
            }

            tx.execute("INSERT INTO urls (url) VALUES (?1)", params![url])?;
            added += 1;
        }

        tx.commit()?;
        Ok(added)
    }

    fn remove_url(&mut self, url: &str) -> StorageResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM urls WHERE url = ?1", params![url])?;
        Ok(removed)
    }

    fn update_last_submitted(&mut self, url: &str, at: DateTime<Utc>) -> StorageResult<usize> {
        let updated = self.conn.execute(
            "UPDATE urls SET last_submitted = ?1 WHERE url = ?2",
            params![format_timestamp(&at), url],
        )?;
        Ok(updated)
    }

    fn record_index_check(
        &mut self,
        url: &str,
        is_indexed: bool,
        checked_at: DateTime<Utc>,
    ) -> StorageResult<usize> {
        let updated = self.conn.execute(
            "UPDATE urls SET is_indexed = ?1, index_checked_date = ?2 WHERE url = ?3",
            params![is_indexed, format_timestamp(&checked_at), url],
        )?;
        Ok(updated)
    }

    fn get_url(&self, url: &str) -> StorageResult<Option<UrlRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM urls WHERE url = ?1", URL_COLUMNS),
                params![url],
                url_from_row,
            )
            .optional()?;

        Ok(record)
    }

    fn load_urls(&self, limit: usize) -> StorageResult<Vec<UrlRecord>> {
        // Never-submitted rows first, then the stalest submissions
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM urls
             ORDER BY last_submitted IS NOT NULL, last_submitted ASC, id ASC
             LIMIT ?1",
            URL_COLUMNS
        ))?;

        let urls = stmt
            .query_map(params![limit as i64], url_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    fn load_unindexed_urls(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<UrlRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM urls
             WHERE is_indexed = 0
               AND (index_checked_date IS NULL OR index_checked_date < ?1)
             ORDER BY id ASC",
            URL_COLUMNS
        ))?;

        let urls = stmt
            .query_map(params![format_timestamp(&cutoff)], url_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    // ===== Quota Tracking =====

    fn get_or_create_quota(&mut self, date: &str) -> StorageResult<QuotaRecord> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO quota (date, count) VALUES (?1, 0)",
            params![date],
        )?;
        if inserted > 0 {
            tracing::debug!("Created quota record for {}", date);
        }

        let quota = self.conn.query_row(
            "SELECT id, date, count FROM quota WHERE date = ?1",
            params![date],
            |row| {
                Ok(QuotaRecord {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    count: row.get(2)?,
                })
            },
        )?;

        Ok(quota)
    }

    fn increment_quota(&mut self, date: &str) -> StorageResult<u32> {
        self.conn.execute(
            "INSERT INTO quota (date, count) VALUES (?1, 1)
             ON CONFLICT(date) DO UPDATE SET count = count + 1",
            params![date],
        )?;

        let count: u32 = self.conn.query_row(
            "SELECT count FROM quota WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    // ===== Submission Log =====

    fn insert_log(&mut self, log_type: LogType, message: &str) -> StorageResult<i64> {
        let now = format_timestamp(&Utc::now());
        self.conn.execute(
            "INSERT INTO logs (timestamp, log_type, message) VALUES (?1, ?2, ?3)",
            params![now, log_type.to_db_string(), message],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn load_logs(&self, limit: usize) -> StorageResult<Vec<LogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, log_type, message FROM logs ORDER BY id DESC LIMIT ?1",
        )?;

        let logs = stmt
            .query_map(params![limit as i64], |row| {
                let raw_timestamp: String = row.get(1)?;
                let timestamp = parse_timestamp(&raw_timestamp).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
                })?;

                Ok(LogRecord {
                    id: row.get(0)?,
                    timestamp,
                    log_type: LogType::from_db_string(&row.get::<_, String>(2)?)
                        .unwrap_or(LogType::Error),
                    message: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    // ===== Statistics =====

    fn count_urls(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM urls", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_indexed_urls(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM urls WHERE is_indexed = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_submitted_urls(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM urls WHERE last_submitted IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_logs_by_type(&self, log_type: LogType) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM logs WHERE log_type = ?1",
            params![log_type.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
