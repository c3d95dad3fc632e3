//! Statistics generation from the indexing database
//!
//! This module provides functionality for extracting and displaying
//! store statistics from the storage layer.

use crate::quota::QuotaTracker;
use crate::storage::{format_timestamp, LogRecord, LogType, Storage};
use crate::IndexerError;

/// Number of log entries shown by `print_statistics`
pub const RECENT_LOG_LIMIT: usize = 5;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// Total number of stored URLs
    pub total_urls: u64,

    /// URLs known to be indexed
    pub indexed_urls: u64,

    /// URLs submitted at least once
    pub submitted_urls: u64,

    /// Submissions counted against today's quota
    pub quota_used: u32,

    /// Daily submission ceiling
    pub daily_limit: u32,

    /// Submissions still available today
    pub quota_remaining: u32,

    /// Accepted notifications in the log
    pub submitted_logs: u64,

    /// Failed notifications in the log
    pub error_logs: u64,

    /// Latest log entries, newest first
    pub recent_logs: Vec<LogRecord>,
}

/// Loads statistics from storage
///
/// Reading today's quota creates its counter row if it does not exist yet.
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `quota` - The daily quota policy
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(IndexerError)` - Failed to query statistics
pub fn load_statistics(
    storage: &mut dyn Storage,
    quota: &QuotaTracker,
) -> Result<IndexStatistics, IndexerError> {
    let quota_used = quota.used(storage)?;

    Ok(IndexStatistics {
        total_urls: storage.count_urls()?,
        indexed_urls: storage.count_indexed_urls()?,
        submitted_urls: storage.count_submitted_urls()?,
        quota_used,
        daily_limit: quota.daily_limit(),
        quota_remaining: quota.remaining_after(quota_used),
        submitted_logs: storage.count_logs_by_type(LogType::Submitted)?,
        error_logs: storage.count_logs_by_type(LogType::Error)?,
        recent_logs: storage.load_logs(RECENT_LOG_LIMIT)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &IndexStatistics) {
    println!("=== Indexing Statistics ===\n");

    println!("URLs:");
    println!("  Stored: {}", stats.total_urls);
    println!("  Submitted at least once: {}", stats.submitted_urls);
    println!(
        "  Never submitted: {}",
        stats.total_urls.saturating_sub(stats.submitted_urls)
    );
    println!("  Indexed: {}", stats.indexed_urls);
    println!();

    println!("Quota (today):");
    println!("  Used: {}/{}", stats.quota_used, stats.daily_limit);
    println!("  Remaining: {}", stats.quota_remaining);
    println!();

    println!("Submission Log:");
    println!("  Submitted: {}", stats.submitted_logs);
    println!("  Errors: {}", stats.error_logs);

    let attempts = stats.submitted_logs + stats.error_logs;
    let success_rate = if attempts > 0 {
        (stats.submitted_logs as f64 / attempts as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "\nSuccess Rate: {:.1}% ({} / {} notifications accepted)",
        success_rate, stats.submitted_logs, attempts
    );

    if !stats.recent_logs.is_empty() {
        println!("\nRecent Activity:");
        for log in &stats.recent_logs {
            println!(
                "  {} [{}] {}",
                format_timestamp(&log.timestamp),
                log.log_type.to_db_string(),
                log.message
            );
        }
    }
}
