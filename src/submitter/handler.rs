//! Per-item result handling for submitted batches

use crate::indexing::PublishResponse;
use crate::quota::QuotaTracker;
use crate::storage::{LogType, Storage};
use crate::{ApiResult, IndexerError};
use chrono::Utc;

/// Receives the outcome of each notification in a batch
///
/// Invoked exactly once per submitted item, in no particular order.
pub trait ResultHandler {
    fn on_result(
        &mut self,
        request_id: &str,
        result: ApiResult<PublishResponse>,
    ) -> Result<(), IndexerError>;
}

/// Records submission outcomes in the store
///
/// For every item:
/// - failures are logged as `error` entries
/// - successes are logged as `submitted` entries and stamp the URL's
///   `last_submitted` time
/// - today's quota is incremented once, whatever the outcome
pub struct BookkeepingHandler<'a> {
    storage: &'a mut dyn Storage,
    quota: QuotaTracker,
    submitted: usize,
    failed: usize,
}

impl<'a> BookkeepingHandler<'a> {
    pub fn new(storage: &'a mut dyn Storage, quota: QuotaTracker) -> Self {
        Self {
            storage,
            quota,
            submitted: 0,
            failed: 0,
        }
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Appends a log entry; a failed log write is reported and ignored
    fn record_log(&mut self, log_type: LogType, message: &str) {
        if let Err(e) = self.storage.insert_log(log_type, message) {
            tracing::error!("Failed to log message. Error: {}", e);
        }
    }
}

impl ResultHandler for BookkeepingHandler<'_> {
    fn on_result(
        &mut self,
        request_id: &str,
        result: ApiResult<PublishResponse>,
    ) -> Result<(), IndexerError> {
        match result {
            Err(e) => {
                tracing::debug!("Request {} failed: {}", request_id, e);
                self.record_log(LogType::Error, &e.to_string());
                self.failed += 1;
            }
            Ok(response) => {
                let url = response.notified_url();
                self.record_log(LogType::Submitted, url);
                self.storage.update_last_submitted(url, Utc::now())?;
                println!("Requested indexing of {}", url);
                self.submitted += 1;
            }
        }

        self.quota.increment(self.storage)?;
        Ok(())
    }
}
